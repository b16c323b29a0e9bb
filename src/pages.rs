use std::sync::Arc;

use axum::{
    debug_handler,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    cache::{QueryCache, QueryKey},
    include_res, problems, res, session, store, AppResult, AppState,
};

const FEATURED_LIMIT: i64 = 3;

#[debug_handler(state = AppState)]
pub async fn home(
    State(db_pool): State<SqlitePool>,
    State(cache): State<Arc<QueryCache>>,
    session: Session,
) -> AppResult<Response> {
    let featured = cache
        .get_or_fetch(QueryKey::Featured, || {
            store::featured_problems(&db_pool, FEATURED_LIMIT)
        })
        .await?;

    let cards: String = featured.iter().map(problems::card).collect();
    let featured_section = if featured.is_empty() {
        String::new()
    } else {
        include_res!(str, "/pages/featured.html").replace("{cards}", &cards)
    };

    let user = session::current_profile(&session, &db_pool).await?;
    Ok(Html(
        include_res!(str, "/pages/index.html")
            .replace("{nav}", &res::navbar(user.as_ref()))
            .replace("{featured}", &featured_section),
    )
    .into_response())
}

#[debug_handler]
pub async fn about(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = session::current_profile(&session, &db_pool).await?;
    Ok(Html(
        include_res!(str, "/pages/about.html").replace("{nav}", &res::navbar(user.as_ref())),
    )
    .into_response())
}
