use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_DISPLAY_NAME: &str = "Player";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    pub external_id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl User {
    pub fn new() -> Self {
        let now = Utc::now();
        User {
            id: Uuid::new_v4().to_string(),
            external_id: Uuid::new_v4().to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            created_at: now,
            last_seen_at: now,
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}
