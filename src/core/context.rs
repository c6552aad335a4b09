use crate::backend::{Backend, Filter};
use crate::models::session::Session;
use rusqlite::Connection;

/// What every backend-touching operation needs: the backend, a live session
/// and the local database (mirror + audit log).
pub struct Context<'a> {
    pub backend: &'a dyn Backend,
    pub session: Session,
    pub conn: &'a Connection,
}

impl<'a> Context<'a> {
    pub fn new(backend: &'a dyn Backend, session: Session, conn: &'a Connection) -> Self {
        Self {
            backend,
            session,
            conn,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.session.user_id
    }

    /// `id = <id>` scoped to the signed-in user.
    pub fn own_row(&self, id: &str) -> [Filter; 2] {
        [Filter::eq("id", id), Filter::owner(&self.session)]
    }
}
