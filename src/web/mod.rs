//! Web layer
//!
//! Router wiring and shared application state. Every route is a GET
//! returning HTML rendered by the theme engine.

pub mod error;
pub mod handlers;

pub use error::WebError;

use crate::db::repositories::{CategoryRepository, TagRepository, UserRepository};
use crate::services::{PageService, PostService};
use crate::theme::ThemeEngine;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<PostService>,
    pub page_service: Arc<PageService>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub tag_repo: Arc<dyn TagRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub theme_engine: Arc<ThemeEngine>,
}

/// Build the application router
///
/// Every path is registered with and without a trailing slash so both
/// `/post/hello` and `/post/hello/` resolve.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/page/{slug}", get(handlers::page))
        .route("/page/{slug}/", get(handlers::page))
        .route("/post/{slug}", get(handlers::post))
        .route("/post/{slug}/", get(handlers::post))
        .route("/created_by/{author_id}", get(handlers::created_by))
        .route("/created_by/{author_id}/", get(handlers::created_by))
        .route("/category/{slug}", get(handlers::category))
        .route("/category/{slug}/", get(handlers::category))
        .route("/tag/{slug}", get(handlers::tag))
        .route("/tag/{slug}/", get(handlers::tag))
        .route("/search", get(handlers::search))
        .route("/search/", get(handlers::search))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
