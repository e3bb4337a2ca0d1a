//! User model
//!
//! Users are referenced as post authors. There is no authentication
//! surface; accounts exist only to attribute content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a post author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// First name (may be empty)
    pub first_name: String,
    /// Last name (may be empty)
    pub last_name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User; the ID is assigned by the database.
    pub fn new(username: String, first_name: String, last_name: String) -> Self {
        Self {
            id: 0,
            username,
            first_name,
            last_name,
            created_at: Utc::now(),
        }
    }

    /// Name shown to readers: "first last" when a first name is set,
    /// otherwise the username.
    pub fn display_name(&self) -> String {
        if self.first_name.is_empty() {
            self.username.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
                .trim_end()
                .to_string()
        }
    }
}
