use serde::{Deserialize, Serialize};

/// A named grouping of event types (e.g. "Restroom", "Symptom").
/// ⇔ backend table `event_categories`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCategory {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Insert payload: the backend generates `id` and `created_at`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub user_id: String,
}

impl EventCategory {
    /// Case-insensitive name comparison, used by every lookup "by name".
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}
