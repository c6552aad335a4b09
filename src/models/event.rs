use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A logged health occurrence.
/// ⇔ backend table `events`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub date: NaiveDate, // ⇔ events.date ("YYYY-MM-DD"), the day the event counts for
    /// Event-type *name*, not id. Renaming or deleting a type orphans the event.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>, // ⇔ events.timestamp (RFC 3339), ordering inside a day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewEvent {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
}

/// Fields the edit form is allowed to change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.notes.is_none()
    }
}

impl Event {
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn local_timestamp(&self) -> DateTime<Local> {
        self.timestamp.with_timezone(&Local)
    }

    /// Local wall-clock time, "HH:MM".
    pub fn time_str(&self) -> String {
        self.local_timestamp().format("%H:%M").to_string()
    }

    /// Notes with empty strings folded into `None` (the form always sends a string).
    pub fn notes_text(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}
