use serde::{Deserialize, Serialize};

/// A named, category-scoped classification for events.
/// ⇔ backend table `event_types`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    pub id: String,
    pub name: String,
    /// ⇔ column `categoryid` (lowercase on the backend)
    #[serde(rename = "categoryid")]
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewEventType {
    pub name: String,
    #[serde(rename = "categoryid")]
    pub category_id: String,
    pub user_id: String,
}

impl EventType {
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}
