//! In-process backend with the same contract as the hosted one.
//! Rows are scoped to their owner the way the row-level policies scope them.

use super::{Backend, Filter, Table};
use crate::errors::{AppError, AppResult};
use crate::models::session::Session;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct User {
    id: String,
    email: String,
    password: String,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    tables: HashMap<Table, Vec<Value>>,
    access: HashMap<String, String>,
    refresh: HashMap<String, String>,
    next_id: u64,
    fail_next: Option<String>,
}

impl State {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn issue_session(&mut self, user: &User) -> Session {
        let access = self.next("access");
        let refresh = self.next("refresh");
        self.access.insert(access.clone(), user.id.clone());
        self.refresh.insert(refresh.clone(), user.id.clone());

        Session {
            access_token: access,
            refresh_token: refresh,
            expires_at: Utc::now().timestamp() + 3600,
            user_id: user.id.clone(),
            email: Some(user.email.clone()),
        }
    }

    fn take_failure(&mut self) -> AppResult<()> {
        match self.fail_next.take() {
            Some(message) => Err(AppError::Backend {
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }

    /// Resolve the caller from the access token, as the backend does from the JWT.
    fn caller(&self, session: &Session) -> AppResult<String> {
        self.access
            .get(&session.access_token)
            .cloned()
            .ok_or(AppError::Backend {
                status: 401,
                message: "invalid JWT: unable to parse or verify signature".into(),
            })
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

fn rls_violation(table: Table) -> AppError {
    AppError::Backend {
        status: 403,
        message: format!(
            "new row violates row-level security policy for table \"{}\"",
            table.name()
        ),
    }
}

fn owned_by(row: &Value, user_id: &str) -> bool {
    row.get("user_id").and_then(Value::as_str) == Some(user_id)
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Value::Object(t), Value::Object(p)) = (target, patch) {
        for (k, v) in p {
            if k != "id" {
                t.insert(k.clone(), v.clone());
            }
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register an account.
    pub fn with_user(self, email: &str, password: &str) -> Self {
        {
            let mut st = self.lock();
            let id = st.next("user");
            st.users.push(User {
                id,
                email: email.to_string(),
                password: password.to_string(),
            });
        }
        self
    }

    /// Make the next call fail with a 500 carrying `message`.
    pub fn fail_next(&self, message: &str) {
        self.lock().fail_next = Some(message.to_string());
    }

    /// Every row of `table`, regardless of owner.
    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.lock().tables.get(&table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn insert_row(st: &mut State, table: Table, row: Value, user_id: &str) -> AppResult<Value> {
        let Value::Object(mut obj) = row else {
            return Err(AppError::Backend {
                status: 400,
                message: "row must be a JSON object".into(),
            });
        };

        if obj.get("user_id").and_then(Value::as_str) != Some(user_id) {
            return Err(rls_violation(table));
        }

        if !obj.contains_key("id") {
            let prefix = match table {
                Table::Categories => "cat",
                Table::EventTypes => "type",
                Table::Events => "evt",
            };
            let id = st.next(prefix);
            obj.insert("id".into(), Value::String(id));
        }

        if table != Table::Events && !obj.contains_key("created_at") {
            obj.insert("created_at".into(), Value::String(Utc::now().to_rfc3339()));
        }

        let row = Value::Object(obj);
        st.tables.entry(table).or_default().push(row.clone());
        Ok(row)
    }
}

impl Backend for MemoryBackend {
    fn sign_up(&self, email: &str, password: &str) -> AppResult<Session> {
        let mut st = self.lock();
        st.take_failure()?;

        if st.users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(AppError::Backend {
                status: 422,
                message: "User already registered".into(),
            });
        }
        if password.len() < 6 {
            return Err(AppError::Backend {
                status: 422,
                message: "Password should be at least 6 characters.".into(),
            });
        }

        let id = st.next("user");
        let user = User {
            id,
            email: email.to_string(),
            password: password.to_string(),
        };
        st.users.push(user.clone());
        Ok(st.issue_session(&user))
    }

    fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let mut st = self.lock();
        st.take_failure()?;

        let user = st
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email) && u.password == password)
            .cloned()
            .ok_or(AppError::Backend {
                status: 400,
                message: "Invalid login credentials".into(),
            })?;

        Ok(st.issue_session(&user))
    }

    fn sign_out(&self, session: &Session) -> AppResult<()> {
        let mut st = self.lock();
        st.take_failure()?;
        st.access.remove(&session.access_token);
        st.refresh.remove(&session.refresh_token);
        Ok(())
    }

    fn refresh_session(&self, refresh_token: &str) -> AppResult<Session> {
        let mut st = self.lock();
        st.take_failure()?;

        let user_id = st.refresh.remove(refresh_token).ok_or(AppError::Backend {
            status: 400,
            message: "Invalid Refresh Token: Refresh Token Not Found".into(),
        })?;

        let user = st
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| AppError::Auth("user no longer exists".into()))?;

        Ok(st.issue_session(&user))
    }

    fn select(&self, session: &Session, table: Table, filters: &[Filter]) -> AppResult<Vec<Value>> {
        let mut st = self.lock();
        st.take_failure()?;
        let user_id = st.caller(session)?;

        let mut rows: Vec<Value> = st
            .tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| owned_by(r, &user_id))
                    .filter(|r| filters.iter().all(|f| f.matches(r)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let col = table.order_column();
        rows.sort_by(|a, b| {
            let ka = a.get(col).and_then(Value::as_str).unwrap_or_default();
            let kb = b.get(col).and_then(Value::as_str).unwrap_or_default();
            ka.cmp(kb)
        });
        Ok(rows)
    }

    fn insert(&self, session: &Session, table: Table, row: Value) -> AppResult<Value> {
        let mut st = self.lock();
        st.take_failure()?;
        let user_id = st.caller(session)?;
        Self::insert_row(&mut st, table, row, &user_id)
    }

    fn update(&self, session: &Session, table: Table, id: &str, patch: Value) -> AppResult<Value> {
        let mut st = self.lock();
        st.take_failure()?;
        let user_id = st.caller(session)?;

        let row = st
            .tables
            .get_mut(&table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|r| owned_by(r, &user_id) && r.get("id").and_then(Value::as_str) == Some(id))
            })
            .ok_or_else(|| AppError::NotFound(format!("{} row '{}'", table.name(), id)))?;

        merge(row, &patch);
        Ok(row.clone())
    }

    fn delete(&self, session: &Session, table: Table, filters: &[Filter]) -> AppResult<usize> {
        let mut st = self.lock();
        st.take_failure()?;
        let user_id = st.caller(session)?;

        if filters.is_empty() {
            return Err(AppError::Validation(
                "refusing to delete without a filter".into(),
            ));
        }

        let rows = st.tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|r| !(owned_by(r, &user_id) && filters.iter().all(|f| f.matches(r))));
        Ok(before - rows.len())
    }

    fn upsert(&self, session: &Session, table: Table, rows: Vec<Value>) -> AppResult<Vec<Value>> {
        let mut st = self.lock();
        st.take_failure()?;
        let user_id = st.caller(session)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.get("id").and_then(Value::as_str).map(str::to_string);

            let existing = id.as_deref().and_then(|id| {
                st.tables.get_mut(&table).and_then(|rows| {
                    rows.iter_mut()
                        .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
                })
            });

            match existing {
                Some(current) if owned_by(current, &user_id) => {
                    merge(current, &row);
                    out.push(current.clone());
                }
                Some(_) => return Err(rls_violation(table)),
                None => out.push(Self::insert_row(&mut st, table, row, &user_id)?),
            }
        }
        Ok(out)
    }
}

/// Build a JSON object from `(key, value)` pairs; handy for fixtures.
pub fn row(pairs: &[(&str, Value)]) -> Value {
    let mut m = Map::new();
    for (k, v) in pairs {
        m.insert((*k).to_string(), v.clone());
    }
    Value::Object(m)
}
