//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `PostFilter` for composing published-post queries
//! - Pagination types for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of posts per page on the public site
pub const PER_PAGE: u32 = 9;

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug
    pub slug: String,
    /// Post title
    pub title: String,
    /// Short summary shown in listings
    pub excerpt: String,
    /// Post body
    pub content: String,
    /// Author user ID
    pub author_id: i64,
    /// Category ID (optional)
    pub category_id: Option<i64>,
    /// Publication flag; unpublished posts are invisible to readers
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    pub author_id: i64,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub is_published: bool,
}

/// Filter composed on top of the published-post base query.
///
/// Each setter narrows the result set; unset fields do not constrain it.
/// The search term matches title, excerpt, or content case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub category_slug: Option<String>,
    pub tag_slug: Option<String>,
    pub author_id: Option<i64>,
    pub search: Option<String>,
}

impl PostFilter {
    /// Filter with no additional constraints (all published posts)
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to posts in the category with the given slug
    pub fn category(mut self, slug: impl Into<String>) -> Self {
        self.category_slug = Some(slug.into());
        self
    }

    /// Restrict to posts carrying the tag with the given slug
    pub fn tag(mut self, slug: impl Into<String>) -> Self {
        self.tag_slug = Some(slug.into());
        self
    }

    /// Restrict to posts written by the given author
    pub fn author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Restrict to posts whose title, excerpt, or content contains the term
    pub fn matching(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: PER_PAGE,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters; page is floored at 1
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.per_page) as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        ((self.total as u32) + self.per_page - 1) / self.per_page
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn filter_setters_compose() {
        let filter = PostFilter::new().category("rust").author(7);
        assert_eq!(filter.category_slug.as_deref(), Some("rust"));
        assert_eq!(filter.author_id, Some(7));
        assert!(filter.tag_slug.is_none());
        assert!(filter.search.is_none());
    }

    #[test]
    fn list_params_floor_page_at_one() {
        let params = ListParams::new(0, PER_PAGE);
        assert_eq!(params.page, 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn list_params_offset_advances_by_per_page() {
        let params = ListParams::new(3, PER_PAGE);
        assert_eq!(params.offset(), 18);
        assert_eq!(params.limit(), 9);
    }

    #[test]
    fn paged_result_metadata() {
        let params = ListParams::new(2, PER_PAGE);
        let result = PagedResult::new(vec![0u8; 9], 20, &params);
        assert_eq!(result.total_pages(), 3);
        assert!(result.has_next());
        assert!(result.has_prev());

        let last = PagedResult::new(vec![0u8; 2], 20, &ListParams::new(3, PER_PAGE));
        assert!(!last.has_next());
        assert!(last.has_prev());
    }

    #[test]
    fn empty_result_has_no_pages() {
        let result: PagedResult<u8> = PagedResult::new(vec![], 0, &ListParams::default());
        assert_eq!(result.total_pages(), 0);
        assert!(!result.has_next());
        assert!(!result.has_prev());
        assert!(result.is_empty());
    }

    proptest! {
        /// The database window described by ListParams never exceeds per_page
        /// items and offsets are aligned to page boundaries.
        #[test]
        fn window_is_bounded(page in 0u32..10_000, per_page in 0u32..500) {
            let params = ListParams::new(page, per_page);
            prop_assert!(params.limit() >= 1);
            prop_assert!(params.limit() <= 100);
            prop_assert_eq!(params.offset() % params.limit(), 0);
        }

        /// Page arithmetic is consistent: a page beyond total_pages has no
        /// next page, and page 1 never has a previous page.
        #[test]
        fn page_metadata_consistent(total in 0i64..100_000, page in 1u32..5_000) {
            let params = ListParams::new(page, PER_PAGE);
            let result: PagedResult<u8> = PagedResult::new(vec![], total, &params);
            if result.page >= result.total_pages() {
                prop_assert!(!result.has_next());
            }
            if result.page == 1 {
                prop_assert!(!result.has_prev());
            }
        }
    }
}
