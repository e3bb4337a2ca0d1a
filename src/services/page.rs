//! Page service

use crate::db::repositories::PageRepository;
use crate::models::{CreatePageInput, Page};
use anyhow::{Context, Result};
use std::sync::Arc;

pub struct PageService {
    repo: Arc<dyn PageRepository>,
}

impl PageService {
    pub fn new(repo: Arc<dyn PageRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: CreatePageInput) -> Result<Page> {
        self.repo.create(&input).await.context("Failed to create page")
    }

    /// Fetch a published page by slug; drafts resolve to None.
    pub async fn get_published(&self, slug: &str) -> Result<Option<Page>> {
        let page = self.repo.get_by_slug(slug).await?;
        Ok(page.filter(|p| p.is_published))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxPageRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> PageService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        PageService::new(SqlxPageRepository::boxed(pool))
    }

    #[tokio::test]
    async fn published_page_is_visible() {
        let service = setup().await;
        service
            .create(CreatePageInput {
                slug: "about".into(),
                title: "About".into(),
                content: "Hello".into(),
                is_published: true,
            })
            .await
            .unwrap();

        let page = service.get_published("about").await.unwrap();
        assert_eq!(page.unwrap().title, "About");
    }

    #[tokio::test]
    async fn draft_page_is_hidden() {
        let service = setup().await;
        service
            .create(CreatePageInput {
                slug: "wip".into(),
                title: "WIP".into(),
                content: "Soon".into(),
                is_published: false,
            })
            .await
            .unwrap();

        assert!(service.get_published("wip").await.unwrap().is_none());
        assert!(service.get_published("missing").await.unwrap().is_none());
    }
}
