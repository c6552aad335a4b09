pub mod category;
pub mod event;
pub mod event_type;
pub mod note;
pub mod session;
pub mod snapshot;
pub mod summary;
