use std::sync::Arc;

use axum::{routing::get, Router};
use crowdsolve::{auth, cache::QueryCache, config::Config, db, pages, problems, AppState};
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crowdsolve=info")),
        )
        .init();

    let config = Config::from_env();
    let db_pool = db::connect(&config.database_url).await?;

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(12)));

    let app_state = AppState {
        db_pool,
        cache: Arc::new(QueryCache::new()),
    };

    let app = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/style.css", get(crowdsolve::res::stylesheet))
        .route("/submit", get(problems::submit_page))
        .nest("/auth", auth::router())
        .nest("/problems", problems::router())
        .nest("/solutions", problems::upvote_router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    tracing::info!(addr = %config.bind_addr, "listening");
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
