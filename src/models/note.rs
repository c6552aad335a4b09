use chrono::NaiveDate;
use serde::Serialize;

/// Free-text note attached to a calendar day. Stored locally only.
#[derive(Debug, Clone, Serialize)]
pub struct DayNote {
    pub date: NaiveDate,
    pub text: String,
    pub updated_at: String,
}
