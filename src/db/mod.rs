pub mod initialize;
pub mod log;
pub mod migrate;
pub mod mirror;
pub mod notes;
pub mod pool;
pub mod session;
pub mod stats;
