//! HTTP handlers
//!
//! The reader-facing routes: the paginated index plus its filtered
//! variants (category, tag, author), free-text search, and the single
//! post and page views. Listings and search render `index.html`; the
//! detail views render `post.html` and `page.html`.

use crate::models::{PagedResult, Post, PostFilter, PER_PAGE};
use crate::web::{AppState, WebError};
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use tera::Context as TeraContext;

/// Page number from the query string.
///
/// Anything that does not parse as a positive integer falls back to
/// page 1; values past the last page are clamped by the service.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    fn number(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(1)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    search: String,
}

/// Template context for one post, with the author and category names
/// resolved so templates never see raw foreign keys.
async fn post_context(state: &AppState, post: &Post) -> Result<serde_json::Value, WebError> {
    let author = state.user_repo.get_by_id(post.author_id).await?;
    let category = match post.category_id {
        Some(id) => state.category_repo.get_by_id(id).await?,
        None => None,
    };

    Ok(json!({
        "id": post.id,
        "slug": post.slug,
        "title": post.title,
        "excerpt": post.excerpt,
        "content": post.content,
        "created_at": post.created_at,
        "author": author.as_ref().map(|u| u.display_name()),
        "author_id": post.author_id,
        "category": category.as_ref().map(|c| c.name.as_str()),
        "category_slug": category.as_ref().map(|c| c.slug.as_str()),
    }))
}

async fn page_obj_context(
    state: &AppState,
    result: &PagedResult<Post>,
) -> Result<serde_json::Value, WebError> {
    let mut posts = Vec::with_capacity(result.len());
    for post in &result.items {
        posts.push(post_context(state, post).await?);
    }

    Ok(json!({
        "posts": posts,
        "number": result.page,
        "total_pages": result.total_pages(),
        "has_next": result.has_next(),
        "has_previous": result.has_prev(),
        "total": result.total,
    }))
}

fn render(state: &AppState, template: &str, context: &TeraContext) -> Html<String> {
    Html(state.theme_engine.render_with_fallback(template, context))
}

async fn listing_page(
    state: &AppState,
    result: &PagedResult<Post>,
    page_title: &str,
) -> Result<Html<String>, WebError> {
    let mut context = TeraContext::new();
    context.insert("page_obj", &page_obj_context(state, result).await?);
    context.insert("page_title", page_title);
    Ok(render(state, "index.html", &context))
}

/// GET / - all published posts, newest first
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let result = state
        .post_service
        .list_published(&PostFilter::new(), query.number())
        .await?;
    listing_page(&state, &result, "Home - ").await
}

/// GET /category/{slug} - published posts in one category
///
/// 404 when the category does not exist or has no published posts.
pub async fn category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let category = state
        .category_repo
        .get_by_slug(&slug)
        .await?
        .ok_or(WebError::NotFound)?;

    let result = state
        .post_service
        .list_published(&PostFilter::new().category(&slug), query.number())
        .await?;
    if result.is_empty() {
        return Err(WebError::NotFound);
    }

    let page_title = format!("Category {} - ", category.name);
    listing_page(&state, &result, &page_title).await
}

/// GET /tag/{slug} - published posts carrying one tag
///
/// 404 when the tag does not exist or no published post carries it.
pub async fn tag(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let tag = state
        .tag_repo
        .get_by_slug(&slug)
        .await?
        .ok_or(WebError::NotFound)?;

    let result = state
        .post_service
        .list_published(&PostFilter::new().tag(&slug), query.number())
        .await?;
    if result.is_empty() {
        return Err(WebError::NotFound);
    }

    let page_title = format!("Tag {} - ", tag.name);
    listing_page(&state, &result, &page_title).await
}

/// GET /created_by/{author_id} - published posts by one author
///
/// 404 when the id is not numeric or the author does not exist; an
/// author with no published posts still renders an empty listing.
pub async fn created_by(
    State(state): State<AppState>,
    Path(author_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let author_id: i64 = author_id.parse().map_err(|_| WebError::NotFound)?;

    let user = state
        .user_repo
        .get_by_id(author_id)
        .await?
        .ok_or(WebError::NotFound)?;

    let result = state
        .post_service
        .list_published(&PostFilter::new().author(author_id), query.number())
        .await?;

    let page_title = format!("Posts by {} - ", user.display_name());
    listing_page(&state, &result, &page_title).await
}

/// GET /search?search={term} - free-text search over published posts
///
/// A blank term redirects back to the index. Results are a single
/// unpaginated window of at most one page; the title shows the term
/// truncated to 30 characters.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, WebError> {
    let term = query.search.trim().to_string();
    if term.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    let posts = state.post_service.search(&term).await?;
    let result = PagedResult {
        total: posts.len() as i64,
        items: posts,
        page: 1,
        per_page: PER_PAGE,
    };

    let display: String = term.chars().take(30).collect();
    let mut context = TeraContext::new();
    context.insert("page_obj", &page_obj_context(&state, &result).await?);
    context.insert("search_value", &term);
    context.insert("page_title", &format!("Search \"{}\" - ", display));
    Ok(render(&state, "index.html", &context).into_response())
}

/// GET /post/{slug} - one published post with its tags
pub async fn post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, WebError> {
    let post = state
        .post_service
        .get_published(&slug)
        .await?
        .ok_or(WebError::NotFound)?;

    let tags = state.post_service.tags_for(post.id).await?;
    let mut post_ctx = post_context(&state, &post).await?;
    post_ctx["tags"] = json!(tags
        .iter()
        .map(|t| json!({ "slug": t.slug, "name": t.name }))
        .collect::<Vec<_>>());

    let mut context = TeraContext::new();
    context.insert("post", &post_ctx);
    context.insert("page_title", &format!("Post {} - ", post.title));
    Ok(render(&state, "post.html", &context))
}

/// GET /page/{slug} - one published flat page
pub async fn page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, WebError> {
    let page = state
        .page_service
        .get_published(&slug)
        .await?
        .ok_or(WebError::NotFound)?;

    let mut context = TeraContext::new();
    context.insert("page", &page);
    context.insert("page_title", &format!("Page {} - ", page.title));
    Ok(render(&state, "page.html", &context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CategoryRepository, PageRepository, PostRepository, SqlxCategoryRepository,
        SqlxPageRepository, SqlxPostRepository, SqlxTagRepository, SqlxUserRepository,
        TagRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::{Category, CreatePageInput, CreatePostInput, Tag, User};
    use crate::services::{PageService, PostService};
    use crate::theme::ThemeEngine;
    use crate::web::build_router;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct TestSite {
        server: TestServer,
        pool: DynDatabasePool,
        // Templates live here for the lifetime of the test.
        _themes: TempDir,
    }

    impl TestSite {
        async fn new() -> Self {
            let themes = TempDir::new().unwrap();
            let theme_dir = themes.path().join("default");
            std::fs::create_dir_all(&theme_dir).unwrap();
            std::fs::write(
                theme_dir.join("index.html"),
                "{{ page_title }}|{% for post in page_obj.posts %}{{ post.slug }};{% endfor %}",
            )
            .unwrap();
            std::fs::write(
                theme_dir.join("post.html"),
                "{{ page_title }}|{{ post.slug }}|{% for tag in post.tags %}{{ tag.name }},{% endfor %}",
            )
            .unwrap();
            std::fs::write(theme_dir.join("page.html"), "{{ page_title }}|{{ page.slug }}")
                .unwrap();

            let pool = create_test_pool().await.unwrap();
            migrations::run_migrations(&pool).await.unwrap();

            let post_repo = SqlxPostRepository::boxed(pool.clone());
            let tag_repo = SqlxTagRepository::boxed(pool.clone());
            let state = AppState {
                post_service: Arc::new(PostService::new(post_repo, tag_repo.clone())),
                page_service: Arc::new(PageService::new(SqlxPageRepository::boxed(pool.clone()))),
                category_repo: SqlxCategoryRepository::boxed(pool.clone()),
                tag_repo,
                user_repo: SqlxUserRepository::boxed(pool.clone()),
                theme_engine: Arc::new(ThemeEngine::new(themes.path(), "default").unwrap()),
            };

            Self {
                server: TestServer::new(build_router(state)).unwrap(),
                pool,
                _themes: themes,
            }
        }

        async fn seed_user(&self, username: &str, first: &str, last: &str) -> User {
            SqlxUserRepository::new(self.pool.clone())
                .create(&User::new(username.into(), first.into(), last.into()))
                .await
                .unwrap()
        }

        async fn seed_category(&self, slug: &str) -> Category {
            SqlxCategoryRepository::new(self.pool.clone())
                .create(&Category::new(slug.into(), slug.to_uppercase()))
                .await
                .unwrap()
        }

        async fn seed_tag(&self, slug: &str) -> Tag {
            SqlxTagRepository::new(self.pool.clone())
                .create(&Tag::new(slug.into(), slug.to_uppercase()))
                .await
                .unwrap()
        }

        async fn seed_post(
            &self,
            slug: &str,
            author_id: i64,
            category_id: Option<i64>,
            published: bool,
        ) -> Post {
            SqlxPostRepository::new(self.pool.clone())
                .create(&CreatePostInput {
                    slug: slug.into(),
                    title: format!("Title {}", slug),
                    excerpt: String::new(),
                    content: format!("Body of {}", slug),
                    author_id,
                    category_id,
                    is_published: published,
                })
                .await
                .unwrap()
        }

        async fn attach_tag(&self, post_id: i64, tag_id: i64) {
            SqlxPostRepository::new(self.pool.clone())
                .add_tag(post_id, tag_id)
                .await
                .unwrap();
        }

        async fn seed_page(&self, slug: &str, published: bool) {
            SqlxPageRepository::new(self.pool.clone())
                .create(&CreatePageInput {
                    slug: slug.into(),
                    title: format!("Title {}", slug),
                    content: "flat page body".into(),
                    is_published: published,
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn index_lists_only_published_posts() {
        let site = TestSite::new().await;
        let author = site.seed_user("ann", "", "").await;
        site.seed_post("visible", author.id, None, true).await;
        site.seed_post("draft", author.id, None, false).await;

        let res = site.server.get("/").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body = res.text();
        assert!(body.starts_with("Home - |"));
        assert!(body.contains("visible;"));
        assert!(!body.contains("draft"));
    }

    #[tokio::test]
    async fn index_shows_nine_posts_per_page() {
        let site = TestSite::new().await;
        let author = site.seed_user("ann", "", "").await;
        for i in 0..12 {
            site.seed_post(&format!("post-{:02}", i), author.id, None, true)
                .await;
        }

        let first = site.server.get("/").await.text();
        assert_eq!(first.matches(';').count(), 9);
        // Newest first: the last insert leads the first page.
        assert!(first.contains("post-11;"));
        assert!(!first.contains("post-00;"));

        let second = site
            .server
            .get("/")
            .add_query_param("page", "2")
            .await
            .text();
        assert_eq!(second.matches(';').count(), 3);
        assert!(second.contains("post-00;"));
    }

    #[tokio::test]
    async fn non_numeric_page_falls_back_to_first() {
        let site = TestSite::new().await;
        let author = site.seed_user("ann", "", "").await;
        site.seed_post("only", author.id, None, true).await;

        let res = site.server.get("/").add_query_param("page", "abc").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert!(res.text().contains("only;"));
    }

    #[tokio::test]
    async fn category_listing_filters_and_titles() {
        let site = TestSite::new().await;
        let author = site.seed_user("ann", "", "").await;
        let cat = site.seed_category("rust").await;
        site.seed_post("in-cat", author.id, Some(cat.id), true).await;
        site.seed_post("no-cat", author.id, None, true).await;

        let res = site.server.get("/category/rust").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body = res.text();
        assert!(body.starts_with("Category RUST - |"));
        assert!(body.contains("in-cat;"));
        assert!(!body.contains("no-cat"));
    }

    #[tokio::test]
    async fn empty_category_listing_is_404() {
        let site = TestSite::new().await;
        let author = site.seed_user("ann", "", "").await;
        let cat = site.seed_category("rust").await;
        site.seed_post("drafted", author.id, Some(cat.id), false).await;

        // Existing category with only drafts, and a missing category.
        let drafts_only = site.server.get("/category/rust").await;
        assert_eq!(drafts_only.status_code(), StatusCode::NOT_FOUND);
        let missing = site.server.get("/category/nope").await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tag_listing_filters_and_titles() {
        let site = TestSite::new().await;
        let author = site.seed_user("ann", "", "").await;
        let tag = site.seed_tag("async").await;
        let tagged = site.seed_post("tagged", author.id, None, true).await;
        site.seed_post("untagged", author.id, None, true).await;
        site.attach_tag(tagged.id, tag.id).await;

        let res = site.server.get("/tag/async").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body = res.text();
        assert!(body.starts_with("Tag ASYNC - |"));
        assert!(body.contains("tagged;"));
        assert!(!body.contains("untagged"));
    }

    #[tokio::test]
    async fn empty_tag_listing_is_404() {
        let site = TestSite::new().await;
        site.seed_tag("unused").await;

        assert_eq!(
            site.server.get("/tag/unused").await.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            site.server.get("/tag/nope").await.status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn created_by_uses_full_name_when_present() {
        let site = TestSite::new().await;
        let named = site.seed_user("ann", "Ann", "Smith").await;
        let bare = site.seed_user("bob", "", "").await;
        site.seed_post("by-ann", named.id, None, true).await;

        let full = site
            .server
            .get(&format!("/created_by/{}", named.id))
            .await
            .text();
        assert!(full.starts_with("Posts by Ann Smith - |"));
        assert!(full.contains("by-ann;"));

        // No posts is still a page, titled by username.
        let empty = site.server.get(&format!("/created_by/{}", bare.id)).await;
        assert_eq!(empty.status_code(), StatusCode::OK);
        assert!(empty.text().starts_with("Posts by bob - |"));
    }

    #[tokio::test]
    async fn created_by_unknown_author_is_404() {
        let site = TestSite::new().await;

        let res = site.server.get("/created_by/9999").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn created_by_non_numeric_id_is_404() {
        let site = TestSite::new().await;
        site.seed_user("ann", "", "").await;

        let res = site.server.get("/created_by/ann").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn trailing_slash_routes_resolve() {
        let site = TestSite::new().await;
        let author = site.seed_user("ann", "", "").await;
        let cat = site.seed_category("rust").await;
        let tag = site.seed_tag("async").await;
        let post = site.seed_post("hello", author.id, Some(cat.id), true).await;
        site.attach_tag(post.id, tag.id).await;
        site.seed_page("about", true).await;

        let by_author = format!("/created_by/{}/", author.id);
        for path in [
            "/post/hello/",
            "/page/about/",
            "/category/rust/",
            "/tag/async/",
            by_author.as_str(),
        ] {
            let res = site.server.get(path).await;
            assert_eq!(res.status_code(), StatusCode::OK, "{}", path);
        }

        let res = site
            .server
            .get("/search/")
            .add_query_param("search", "hello")
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn blank_search_redirects_to_index() {
        let site = TestSite::new().await;

        for query in ["", "   "] {
            let res = site
                .server
                .get("/search")
                .add_query_param("search", query)
                .await;
            assert_eq!(res.status_code(), StatusCode::SEE_OTHER);
            assert_eq!(res.header("location"), "/");
        }
    }

    #[tokio::test]
    async fn search_matches_title_excerpt_and_content() {
        let site = TestSite::new().await;
        let author = site.seed_user("ann", "", "").await;
        site.seed_post("needle-title", author.id, None, true).await;
        site.seed_post("plain", author.id, None, true).await;
        site.seed_post("needle-draft", author.id, None, false).await;

        let res = site
            .server
            .get("/search")
            .add_query_param("search", "NEEDLE")
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body = res.text();
        assert!(body.starts_with("Search \"NEEDLE\" - |"));
        assert!(body.contains("needle-title;"));
        assert!(!body.contains("plain"));
        assert!(!body.contains("needle-draft"));
    }

    #[tokio::test]
    async fn search_title_truncates_long_terms() {
        let site = TestSite::new().await;

        let term = "x".repeat(40);
        let res = site
            .server
            .get("/search")
            .add_query_param("search", &term)
            .await;
        let expected = format!("Search \"{}\" - |", "x".repeat(30));
        assert!(res.text().starts_with(&expected));
    }

    #[tokio::test]
    async fn post_detail_shows_tags_and_hides_drafts() {
        let site = TestSite::new().await;
        let author = site.seed_user("ann", "", "").await;
        let tag = site.seed_tag("async").await;
        let post = site.seed_post("hello", author.id, None, true).await;
        site.seed_post("secret", author.id, None, false).await;
        site.attach_tag(post.id, tag.id).await;

        let res = site.server.get("/post/hello").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body = res.text();
        assert!(body.starts_with("Post Title hello - |hello|"));
        assert!(body.contains("ASYNC,"));

        assert_eq!(
            site.server.get("/post/secret").await.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            site.server.get("/post/missing").await.status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn page_detail_hides_unpublished() {
        let site = TestSite::new().await;
        site.seed_page("about", true).await;
        site.seed_page("hidden", false).await;

        let res = site.server.get("/page/about").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert!(res.text().starts_with("Page Title about - |about"));

        assert_eq!(
            site.server.get("/page/hidden").await.status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
