pub mod auth;
pub mod context;
pub mod events;
pub mod export;
pub mod import;
pub mod log;
pub mod sync;
pub mod taxonomy;
pub mod views;
pub mod watch;
