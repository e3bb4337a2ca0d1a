//! Post repository
//!
//! Home of the published-post query: every public listing, detail view,
//! and search goes through `list_published`/`count_published` with a
//! `PostFilter`, so unpublished posts can never leak into reader-facing
//! output. Results are ordered by descending id (newest first).

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreatePostInput, Post, PostFilter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post
    async fn create(&self, input: &CreatePostInput) -> Result<Post>;

    /// Fetch a post by id regardless of publication state
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Fetch a published post by slug; drafts resolve to None
    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// List published posts matching the filter, newest first
    async fn list_published(&self, filter: &PostFilter, offset: i64, limit: i64)
        -> Result<Vec<Post>>;

    /// Count published posts matching the filter
    async fn count_published(&self, filter: &PostFilter) -> Result<i64>;

    /// Associate a tag with a post
    async fn add_tag(&self, post_id: i64, tag_id: i64) -> Result<()>;
}

/// SQLx-based post repository supporting SQLite and MySQL.
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_published_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => {
                get_published_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await
            }
        }
    }

    async fn list_published(
        &self,
        filter: &PostFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_published_sqlite(self.pool.as_sqlite().unwrap(), filter, offset, limit).await
            }
            DatabaseDriver::Mysql => {
                list_published_mysql(self.pool.as_mysql().unwrap(), filter, offset, limit).await
            }
        }
    }

    async fn count_published(&self, filter: &PostFilter) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_published_sqlite(self.pool.as_sqlite().unwrap(), filter).await
            }
            DatabaseDriver::Mysql => {
                count_published_mysql(self.pool.as_mysql().unwrap(), filter).await
            }
        }
    }

    async fn add_tag(&self, post_id: i64, tag_id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                add_tag_sqlite(self.pool.as_sqlite().unwrap(), post_id, tag_id).await
            }
            DatabaseDriver::Mysql => {
                add_tag_mysql(self.pool.as_mysql().unwrap(), post_id, tag_id).await
            }
        }
    }
}

const POST_COLUMNS: &str =
    "p.id, p.slug, p.title, p.excerpt, p.content, p.author_id, p.category_id, p.is_published, p.created_at";

/// Build the WHERE clause for a published-post query.
///
/// Placeholder order matches `bind_filter`: category slug, tag slug,
/// author id, then the three search patterns.
fn published_where(filter: &PostFilter) -> String {
    let mut clauses = vec!["p.is_published = 1".to_string()];

    if filter.category_slug.is_some() {
        clauses.push("p.category_id IN (SELECT id FROM categories WHERE slug = ?)".to_string());
    }
    if filter.tag_slug.is_some() {
        clauses.push(
            "p.id IN (SELECT pt.post_id FROM post_tags pt \
             JOIN tags t ON t.id = pt.tag_id WHERE t.slug = ?)"
                .to_string(),
        );
    }
    if filter.author_id.is_some() {
        clauses.push("p.author_id = ?".to_string());
    }
    if filter.search.is_some() {
        clauses.push(
            "(LOWER(p.title) LIKE ? ESCAPE '!' \
             OR LOWER(p.excerpt) LIKE ? ESCAPE '!' \
             OR LOWER(p.content) LIKE ? ESCAPE '!')"
                .to_string(),
        );
    }

    clauses.join(" AND ")
}

/// Turn a search term into a LIKE pattern that matches it literally.
///
/// `%` and `_` in the term are wildcards to LIKE, so they are escaped
/// with `!` (declared via ESCAPE in `published_where`; `!` reads the
/// same in SQLite and MySQL string literals, unlike a backslash).
fn search_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('!', "!!")
        .replace('%', "!%")
        .replace('_', "!_");
    format!("%{}%", escaped)
}

// ============================================================================
// SQLite implementations
// ============================================================================

fn bind_filter_sqlite<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    filter: &'q PostFilter,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    if let Some(slug) = &filter.category_slug {
        query = query.bind(slug);
    }
    if let Some(slug) = &filter.tag_slug {
        query = query.bind(slug);
    }
    if let Some(author_id) = filter.author_id {
        query = query.bind(author_id);
    }
    if let Some(term) = &filter.search {
        let pattern = search_pattern(term);
        query = query
            .bind(pattern.clone())
            .bind(pattern.clone())
            .bind(pattern);
    }
    query
}

async fn create_sqlite(pool: &SqlitePool, input: &CreatePostInput) -> Result<Post> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO posts (slug, title, excerpt, content, author_id, category_id, is_published, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&input.slug)
    .bind(&input.title)
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(input.author_id)
    .bind(input.category_id)
    .bind(input.is_published)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(Post {
        id: result.last_insert_rowid(),
        slug: input.slug.clone(),
        title: input.title.clone(),
        excerpt: input.excerpt.clone(),
        content: input.content.clone(),
        author_id: input.author_id,
        category_id: input.category_id,
        is_published: input.is_published,
        created_at: now,
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {} FROM posts p WHERE p.id = ?", POST_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post")?;
    row.map(|r| row_to_post_sqlite(&r)).transpose()
}

async fn get_published_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM posts p WHERE p.slug = ? AND p.is_published = 1",
        POST_COLUMNS
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get published post")?;
    row.map(|r| row_to_post_sqlite(&r)).transpose()
}

async fn list_published_sqlite(
    pool: &SqlitePool,
    filter: &PostFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<Post>> {
    let sql = format!(
        "SELECT {} FROM posts p WHERE {} ORDER BY p.id DESC LIMIT ? OFFSET ?",
        POST_COLUMNS,
        published_where(filter)
    );

    let rows = bind_filter_sqlite(sqlx::query(&sql), filter)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list published posts")?;

    rows.iter().map(row_to_post_sqlite).collect()
}

async fn count_published_sqlite(pool: &SqlitePool, filter: &PostFilter) -> Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) as count FROM posts p WHERE {}",
        published_where(filter)
    );

    let row = bind_filter_sqlite(sqlx::query(&sql), filter)
        .fetch_one(pool)
        .await
        .context("Failed to count published posts")?;

    Ok(row.get("count"))
}

async fn add_tag_sqlite(pool: &SqlitePool, post_id: i64, tag_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
        .bind(post_id)
        .bind(tag_id)
        .execute(pool)
        .await
        .context("Failed to tag post")?;
    Ok(())
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    Ok(Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        author_id: row.get("author_id"),
        category_id: row.get("category_id"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

fn bind_filter_mysql<'q>(
    mut query: sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>,
    filter: &'q PostFilter,
) -> sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments> {
    if let Some(slug) = &filter.category_slug {
        query = query.bind(slug);
    }
    if let Some(slug) = &filter.tag_slug {
        query = query.bind(slug);
    }
    if let Some(author_id) = filter.author_id {
        query = query.bind(author_id);
    }
    if let Some(term) = &filter.search {
        let pattern = search_pattern(term);
        query = query
            .bind(pattern.clone())
            .bind(pattern.clone())
            .bind(pattern);
    }
    query
}

async fn create_mysql(pool: &MySqlPool, input: &CreatePostInput) -> Result<Post> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO posts (slug, title, excerpt, content, author_id, category_id, is_published, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&input.slug)
    .bind(&input.title)
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(input.author_id)
    .bind(input.category_id)
    .bind(input.is_published)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(Post {
        id: result.last_insert_id() as i64,
        slug: input.slug.clone(),
        title: input.title.clone(),
        excerpt: input.excerpt.clone(),
        content: input.content.clone(),
        author_id: input.author_id,
        category_id: input.category_id,
        is_published: input.is_published,
        created_at: now,
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {} FROM posts p WHERE p.id = ?", POST_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post")?;
    row.map(|r| row_to_post_mysql(&r)).transpose()
}

async fn get_published_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM posts p WHERE p.slug = ? AND p.is_published = 1",
        POST_COLUMNS
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get published post")?;
    row.map(|r| row_to_post_mysql(&r)).transpose()
}

async fn list_published_mysql(
    pool: &MySqlPool,
    filter: &PostFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<Post>> {
    let sql = format!(
        "SELECT {} FROM posts p WHERE {} ORDER BY p.id DESC LIMIT ? OFFSET ?",
        POST_COLUMNS,
        published_where(filter)
    );

    let rows = bind_filter_mysql(sqlx::query(&sql), filter)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list published posts")?;

    rows.iter().map(row_to_post_mysql).collect()
}

async fn count_published_mysql(pool: &MySqlPool, filter: &PostFilter) -> Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) as count FROM posts p WHERE {}",
        published_where(filter)
    );

    let row = bind_filter_mysql(sqlx::query(&sql), filter)
        .fetch_one(pool)
        .await
        .context("Failed to count published posts")?;

    Ok(row.get("count"))
}

async fn add_tag_mysql(pool: &MySqlPool, post_id: i64, tag_id: i64) -> Result<()> {
    sqlx::query("INSERT IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
        .bind(post_id)
        .bind(tag_id)
        .execute(pool)
        .await
        .context("Failed to tag post")?;
    Ok(())
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Post> {
    Ok(Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        author_id: row.get("author_id"),
        category_id: row.get("category_id"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}
