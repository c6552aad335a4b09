//! Unified application error type.
//! All modules (backend, db, core, cli, utils) return AppError to keep the
//! error handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Local database
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Backend
    // ---------------------------
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer from the backend; `message` is the backend's own text.
    #[error("{message} (HTTP {status})")]
    Backend { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not signed in. Run `healthlog auth login` first.")]
    NotAuthenticated,

    #[error("Offline mode: '{0}' needs the backend")]
    Offline(String),

    #[error("Realtime error: {0}")]
    Realtime(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    // ---------------------------
    // Logic errors
    // ---------------------------
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous reference '{0}': use the id instead")]
    Ambiguous(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Export(err.to_string())
    }
}

impl From<tungstenite::Error> for AppError {
    fn from(err: tungstenite::Error) -> Self {
        AppError::Realtime(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
