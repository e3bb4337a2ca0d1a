//! Folha - a small server-rendered blog

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folha::{
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCategoryRepository, SqlxPageRepository, SqlxPostRepository, SqlxTagRepository,
            SqlxUserRepository,
        },
    },
    services::{PageService, PostService},
    theme::ThemeEngine,
    web::{build_router, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folha=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Folha...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let page_repo = SqlxPageRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let user_repo = SqlxUserRepository::boxed(pool.clone());

    // Initialize services
    let post_service = Arc::new(PostService::new(post_repo, tag_repo.clone()));
    let page_service = Arc::new(PageService::new(page_repo));

    // Initialize theme engine
    let theme_engine = ThemeEngine::new(&config.theme.path, &config.theme.active)?;
    tracing::info!("Theme engine initialized: {}", config.theme.active);

    // Build application state
    let state = AppState {
        post_service,
        page_service,
        category_repo,
        tag_repo,
        user_repo,
        theme_engine: Arc::new(theme_engine),
    };

    // Build router and start server
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
