//! Client side of the hosted backend: authentication, table access and the
//! realtime change feed. Nothing here stores data; the backend owns it.

pub mod memory;
pub mod realtime;
pub mod rest;

use crate::errors::AppResult;
use crate::models::session::Session;
use serde_json::Value;

pub use memory::MemoryBackend;
pub use rest::RestBackend;

/// Backend tables used by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Categories,
    EventTypes,
    Events,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Categories, Table::EventTypes, Table::Events];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Categories => "event_categories",
            Table::EventTypes => "event_types",
            Table::Events => "events",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Table::ALL.into_iter().find(|t| t.name() == s)
    }

    /// Column used to order `select` results.
    pub fn order_column(&self) -> &'static str {
        match self {
            Table::Categories | Table::EventTypes => "created_at",
            Table::Events => "timestamp",
        }
    }
}

/// Equality filter, `column = value` (the only filter the app needs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &str, value: &str) -> Self {
        Self {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    /// Owner filter applied to every table call.
    pub fn owner(session: &Session) -> Self {
        Self::eq("user_id", &session.user_id)
    }

    pub fn matches(&self, row: &Value) -> bool {
        match row.get(&self.column) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == self.value,
        }
    }
}

/// The request/response surface of the backend SDK.
pub trait Backend {
    fn sign_up(&self, email: &str, password: &str) -> AppResult<Session>;
    fn sign_in(&self, email: &str, password: &str) -> AppResult<Session>;
    fn sign_out(&self, session: &Session) -> AppResult<()>;
    fn refresh_session(&self, refresh_token: &str) -> AppResult<Session>;

    fn select(&self, session: &Session, table: Table, filters: &[Filter]) -> AppResult<Vec<Value>>;
    fn insert(&self, session: &Session, table: Table, row: Value) -> AppResult<Value>;
    fn update(&self, session: &Session, table: Table, id: &str, patch: Value) -> AppResult<Value>;
    /// Returns how many rows were removed.
    fn delete(&self, session: &Session, table: Table, filters: &[Filter]) -> AppResult<usize>;
    /// Insert or merge on primary key.
    fn upsert(&self, session: &Session, table: Table, rows: Vec<Value>) -> AppResult<Vec<Value>>;
}

/// Kind of row change delivered by the realtime feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn from_wire(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INSERT" => Some(ChangeKind::Insert),
            "UPDATE" => Some(ChangeKind::Update),
            "DELETE" => Some(ChangeKind::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

/// One row change from the realtime feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub record: Option<Value>,
    pub old_record: Option<Value>,
}

impl ChangeEvent {
    /// Id of the affected row (new record first, old record for deletes).
    pub fn row_id(&self) -> Option<&str> {
        self.record
            .as_ref()
            .and_then(|r| r.get("id"))
            .or_else(|| self.old_record.as_ref().and_then(|r| r.get("id")))
            .and_then(Value::as_str)
    }
}
