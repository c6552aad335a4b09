//! HTTP client for the hosted backend (auth + table REST endpoints).

use super::{Backend, Filter, Table};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::session::Session;
use chrono::Utc;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=representation";

pub struct RestBackend {
    base_url: String,
    anon_key: String,
    client: Client,
}

/// Token endpoint answer. Sign-up may return a bare user (email confirmation pending).
#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: Option<AuthUser>,
    id: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

impl RestBackend {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> AppResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(AppError::Config(
                "backend_url is not configured (see `healthlog config --edit`)".into(),
            ));
        }
        if anon_key.trim().is_empty() {
            return Err(AppError::Config(
                "anon_key is not configured (see `healthlog config --edit`)".into(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("healthlog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url,
            anon_key: anon_key.trim().to_string(),
            client,
        })
    }

    pub fn from_config(cfg: &Config) -> AppResult<Self> {
        Self::new(
            &cfg.backend_url,
            &cfg.anon_key,
            Duration::from_secs(cfg.request_timeout_secs.max(1)),
        )
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn authorized(&self, req: RequestBuilder, access_token: &str) -> RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    /// Send the request and turn any non-2xx answer into `AppError::Backend`.
    fn send(&self, what: &str, req: RequestBuilder) -> AppResult<Response> {
        debug!(operation = what, "backend request");
        let resp = req.send()?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().unwrap_or_default();
        warn!(operation = what, status = status.as_u16(), "backend request failed");
        Err(AppError::Backend {
            status: status.as_u16(),
            message: extract_message(&body, status),
        })
    }

    fn token_request(&self, grant_type: &str, body: Value) -> AppResult<Session> {
        let req = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&body);

        let resp = self.send(grant_type, req)?;
        let auth: AuthResponse = resp.json()?;
        session_from_auth(auth)
    }

    fn filter_query(filters: &[Filter]) -> Vec<(String, String)> {
        filters
            .iter()
            .map(|f| (f.column.clone(), format!("eq.{}", f.value)))
            .collect()
    }
}

/// Pull the human-readable message out of an error body.
pub fn extract_message(body: &str, status: StatusCode) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(s) = v.get(key).and_then(Value::as_str)
                && !s.trim().is_empty()
            {
                return s.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

fn session_from_auth(auth: AuthResponse) -> AppResult<Session> {
    let (Some(access_token), Some(refresh_token)) = (auth.access_token, auth.refresh_token) else {
        // Sign-up accepted but no session: the project requires email confirmation.
        return Err(match auth.id.or(auth.user.map(|u| u.id)) {
            Some(_) => AppError::Auth(format!(
                "account created for {}; confirm the email address, then log in",
                auth.email.as_deref().unwrap_or("this address")
            )),
            None => AppError::Auth("backend returned no session".into()),
        });
    };

    let user = auth
        .user
        .ok_or_else(|| AppError::Auth("backend returned no user".into()))?;

    let expires_at = auth
        .expires_at
        .unwrap_or_else(|| Utc::now().timestamp() + auth.expires_in.unwrap_or(3600));

    Ok(Session {
        access_token,
        refresh_token,
        expires_at,
        user_id: user.id,
        email: user.email,
    })
}

fn first_row(rows: Vec<Value>, what: &str) -> AppResult<Value> {
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(what.to_string()))
}

impl Backend for RestBackend {
    fn sign_up(&self, email: &str, password: &str) -> AppResult<Session> {
        let req = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }));

        let resp = self.send("signup", req)?;
        let auth: AuthResponse = resp.json()?;
        session_from_auth(auth)
    }

    fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        self.token_request("password", json!({ "email": email, "password": password }))
    }

    fn sign_out(&self, session: &Session) -> AppResult<()> {
        let req = self.authorized(
            self.client.post(self.auth_url("logout")),
            &session.access_token,
        );
        self.send("logout", req)?;
        Ok(())
    }

    fn refresh_session(&self, refresh_token: &str) -> AppResult<Session> {
        self.token_request("refresh_token", json!({ "refresh_token": refresh_token }))
    }

    fn select(&self, session: &Session, table: Table, filters: &[Filter]) -> AppResult<Vec<Value>> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(Self::filter_query(filters));
        query.push(("order".to_string(), format!("{}.asc", table.order_column())));

        let req = self.authorized(
            self.client.get(self.table_url(table)).query(&query),
            &session.access_token,
        );
        let rows: Vec<Value> = self.send(table.name(), req)?.json()?;
        debug!(table = table.name(), rows = rows.len(), "select");
        Ok(rows)
    }

    fn insert(&self, session: &Session, table: Table, row: Value) -> AppResult<Value> {
        let req = self.authorized(
            self.client
                .post(self.table_url(table))
                .header("Prefer", PREFER_REPRESENTATION)
                .json(&row),
            &session.access_token,
        );
        let rows: Vec<Value> = self.send(table.name(), req)?.json()?;
        first_row(rows, table.name())
    }

    fn update(&self, session: &Session, table: Table, id: &str, patch: Value) -> AppResult<Value> {
        let query = Self::filter_query(&[Filter::eq("id", id), Filter::owner(session)]);
        let req = self.authorized(
            self.client
                .patch(self.table_url(table))
                .query(&query)
                .header("Prefer", PREFER_REPRESENTATION)
                .json(&patch),
            &session.access_token,
        );
        let rows: Vec<Value> = self.send(table.name(), req)?.json()?;
        first_row(rows, &format!("{} row '{}'", table.name(), id))
    }

    fn delete(&self, session: &Session, table: Table, filters: &[Filter]) -> AppResult<usize> {
        // An unfiltered DELETE would wipe every row the policy lets us see.
        if filters.is_empty() {
            return Err(AppError::Validation(
                "refusing to delete without a filter".into(),
            ));
        }

        let req = self.authorized(
            self.client
                .delete(self.table_url(table))
                .query(&Self::filter_query(filters))
                .header("Prefer", PREFER_REPRESENTATION),
            &session.access_token,
        );
        let rows: Vec<Value> = self.send(table.name(), req)?.json()?;
        Ok(rows.len())
    }

    fn upsert(&self, session: &Session, table: Table, rows: Vec<Value>) -> AppResult<Vec<Value>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let req = self.authorized(
            self.client
                .post(self.table_url(table))
                .header("Prefer", PREFER_UPSERT)
                .json(&rows),
            &session.access_token,
        );
        Ok(self.send(table.name(), req)?.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_backend_text() {
        let body = r#"{"code":"invalid_credentials","msg":"Invalid login credentials"}"#;
        assert_eq!(
            extract_message(body, StatusCode::BAD_REQUEST),
            "Invalid login credentials"
        );

        let body = r#"{"error":"invalid_grant","error_description":"Refresh Token Not Found"}"#;
        assert_eq!(
            extract_message(body, StatusCode::BAD_REQUEST),
            "Refresh Token Not Found"
        );
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(extract_message("", StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(extract_message("boom", StatusCode::BAD_GATEWAY), "boom");
    }

    #[test]
    fn missing_configuration_is_reported() {
        let err = RestBackend::new("", "key", Duration::from_secs(1)).err();
        assert!(matches!(err, Some(AppError::Config(_))));
    }

    #[test]
    fn pending_confirmation_is_an_auth_error() {
        let auth: AuthResponse =
            serde_json::from_str(r#"{"id":"u1","email":"a@b.c"}"#).unwrap();
        let err = session_from_auth(auth).unwrap_err();
        assert!(err.to_string().contains("confirm the email"));
    }
}
