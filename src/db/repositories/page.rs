//! Page repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreatePageInput, Page};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn create(&self, input: &CreatePageInput) -> Result<Page>;
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Page>>;
}

pub struct SqlxPageRepository {
    pool: DynDatabasePool,
}

impl SqlxPageRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PageRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PageRepository for SqlxPageRepository {
    async fn create(&self, input: &CreatePageInput) -> Result<Page> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await,
            DatabaseDriver::Mysql => get_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await,
        }
    }
}

const PAGE_COLUMNS: &str = "id, slug, title, content, is_published, created_at";

// SQLite implementations

async fn create_sqlite(pool: &SqlitePool, input: &CreatePageInput) -> Result<Page> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO pages (slug, title, content, is_published, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&input.slug)
    .bind(&input.title)
    .bind(&input.content)
    .bind(input.is_published)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create page")?;

    Ok(Page {
        id: result.last_insert_rowid(),
        slug: input.slug.clone(),
        title: input.title.clone(),
        content: input.content.clone(),
        is_published: input.is_published,
        created_at: now,
    })
}

async fn get_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Page>> {
    let row = sqlx::query(&format!("SELECT {} FROM pages WHERE slug = ?", PAGE_COLUMNS))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get page")?;
    row.map(|r| row_to_page_sqlite(&r)).transpose()
}

fn row_to_page_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Page> {
    Ok(Page {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        content: row.get("content"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}

// MySQL implementations

async fn create_mysql(pool: &MySqlPool, input: &CreatePageInput) -> Result<Page> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO pages (slug, title, content, is_published, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&input.slug)
    .bind(&input.title)
    .bind(&input.content)
    .bind(input.is_published)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create page")?;

    Ok(Page {
        id: result.last_insert_id() as i64,
        slug: input.slug.clone(),
        title: input.title.clone(),
        content: input.content.clone(),
        is_published: input.is_published,
        created_at: now,
    })
}

async fn get_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Page>> {
    let row = sqlx::query(&format!("SELECT {} FROM pages WHERE slug = ?", PAGE_COLUMNS))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get page")?;
    row.map(|r| row_to_page_mysql(&r)).transpose()
}

fn row_to_page_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Page> {
    Ok(Page {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        content: row.get("content"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}
