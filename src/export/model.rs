// src/export/model.rs

use crate::errors::{AppError, AppResult};
use crate::models::event::Event;
use crate::models::snapshot::Snapshot;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Flat event row for CSV / JSON. `category` and `time` are informative;
/// import only reads the stored fields.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EventExport {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub notes: String,
    pub timestamp: String,
}

impl EventExport {
    pub fn from_event(snapshot: &Snapshot, e: &Event) -> Self {
        Self {
            id: e.id.clone(),
            date: e.date_str(),
            time: e.time_str(),
            category: snapshot.category_name_for(&e.kind),
            kind: e.kind.clone(),
            notes: e.notes_text().unwrap_or_default().to_string(),
            timestamp: e.timestamp.to_rfc3339(),
        }
    }

    /// Back to a stored event, owned by `user_id`.
    pub fn into_event(self, user_id: &str) -> AppResult<Event> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| AppError::InvalidDate(self.date.clone()))?;
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|_| AppError::InvalidTime(self.timestamp.clone()))?
            .with_timezone(&Utc);

        if self.id.trim().is_empty() {
            return Err(AppError::Validation("event without id".into()));
        }
        if self.kind.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "event '{}' has no type",
                self.id
            )));
        }

        Ok(Event {
            id: self.id,
            date,
            kind: self.kind,
            notes: Some(self.notes).filter(|n| !n.trim().is_empty()),
            timestamp,
            user_id: Some(user_id.to_string()),
        })
    }
}
