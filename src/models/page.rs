//! Page model for static pages (about, contact, ...)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static page model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
    /// Publication flag; unpublished pages are invisible to readers
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a page
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePageInput {
    pub slug: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_published: bool,
}
