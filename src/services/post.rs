//! Post service
//!
//! The published-post query provider: combines the repository's filtered
//! queries with page-window arithmetic. Every reader-facing surface goes
//! through this service, which is what guarantees drafts stay invisible.

use crate::db::repositories::{PostRepository, TagRepository};
use crate::models::{ListParams, PagedResult, Post, PostFilter, Tag, PER_PAGE};
use anyhow::{Context, Result};
use std::sync::Arc;

pub struct PostService {
    repo: Arc<dyn PostRepository>,
    tag_repo: Arc<dyn TagRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>, tag_repo: Arc<dyn TagRepository>) -> Self {
        Self { repo, tag_repo }
    }

    /// List published posts matching the filter, 9 per page.
    ///
    /// The requested 1-based page number is clamped into the valid range:
    /// 0 becomes 1, and anything past the end becomes the last page. An
    /// empty result set still reports page 1 so templates have a stable
    /// context.
    pub async fn list_published(
        &self,
        filter: &PostFilter,
        page: u32,
    ) -> Result<PagedResult<Post>> {
        let total = self
            .repo
            .count_published(filter)
            .await
            .context("Failed to count published posts")?;

        let last_page = (((total as u32) + PER_PAGE - 1) / PER_PAGE).max(1);
        let params = ListParams::new(page.clamp(1, last_page), PER_PAGE);

        let items = self
            .repo
            .list_published(filter, params.offset(), params.limit())
            .await
            .context("Failed to list published posts")?;

        Ok(PagedResult::new(items, total, &params))
    }

    /// Fetch a published post by slug; drafts and unknown slugs are None.
    pub async fn get_published(&self, slug: &str) -> Result<Option<Post>> {
        self.repo.get_published_by_slug(slug).await
    }

    /// Free-text search over published posts, truncated to one page.
    ///
    /// Search results are a plain list: no pagination metadata, at most
    /// 9 items.
    pub async fn search(&self, term: &str) -> Result<Vec<Post>> {
        self.repo
            .list_published(&PostFilter::new().matching(term), 0, PER_PAGE as i64)
            .await
            .context("Failed to search posts")
    }

    /// Tags attached to a post
    pub async fn tags_for(&self, post_id: i64) -> Result<Vec<Tag>> {
        self.tag_repo.list_by_post(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxPostRepository, SqlxTagRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreatePostInput, User};

    async fn service_with_posts(published: usize, drafts: usize) -> PostService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let author = SqlxUserRepository::new(pool.clone())
            .create(&User::new("ann".into(), String::new(), String::new()))
            .await
            .unwrap();

        let repo = SqlxPostRepository::boxed(pool.clone());
        for i in 0..(published + drafts) {
            repo.create(&CreatePostInput {
                slug: format!("post-{}", i),
                title: format!("Post {}", i),
                excerpt: String::new(),
                content: "body".into(),
                author_id: author.id,
                category_id: None,
                is_published: i < published,
            })
            .await
            .unwrap();
        }

        PostService::new(repo, SqlxTagRepository::boxed(pool))
    }

    #[tokio::test]
    async fn pages_are_capped_at_nine_items() {
        let service = service_with_posts(12, 0).await;

        let first = service
            .list_published(&PostFilter::new(), 1)
            .await
            .unwrap();
        assert_eq!(first.len(), 9);
        assert_eq!(first.total, 12);
        assert!(first.has_next());

        let second = service
            .list_published(&PostFilter::new(), 2)
            .await
            .unwrap();
        assert_eq!(second.len(), 3);
        assert!(!second.has_next());
        assert!(second.has_prev());
    }

    #[tokio::test]
    async fn out_of_range_page_clamps_to_last() {
        let service = service_with_posts(12, 0).await;

        let result = service
            .list_published(&PostFilter::new(), 99)
            .await
            .unwrap();
        assert_eq!(result.page, 2);
        assert_eq!(result.len(), 3);
    }

    #[tokio::test]
    async fn page_zero_clamps_to_first() {
        let service = service_with_posts(3, 0).await;

        let result = service
            .list_published(&PostFilter::new(), 0)
            .await
            .unwrap();
        assert_eq!(result.page, 1);
        assert_eq!(result.len(), 3);
    }

    #[tokio::test]
    async fn empty_collection_reports_page_one() {
        let service = service_with_posts(0, 2).await;

        let result = service
            .list_published(&PostFilter::new(), 5)
            .await
            .unwrap();
        assert_eq!(result.page, 1);
        assert_eq!(result.total, 0);
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn search_truncates_to_one_page() {
        let service = service_with_posts(12, 3).await;

        let hits = service.search("Post").await.unwrap();
        assert_eq!(hits.len(), 9);
        assert!(hits.iter().all(|p| p.is_published));
    }

    #[tokio::test]
    async fn drafts_invisible_to_slug_lookup() {
        let service = service_with_posts(1, 1).await;

        assert!(service.get_published("post-0").await.unwrap().is_some());
        assert!(service.get_published("post-1").await.unwrap().is_none());
    }
}
