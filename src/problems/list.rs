use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    cache::{QueryCache, QueryKey},
    db::Category,
    include_res, session, store, AppResult, AppState,
};

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    pub(crate) category: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn list(
    Query(ListQuery { category }): Query<ListQuery>,
    State(db_pool): State<SqlitePool>,
    State(cache): State<Arc<QueryCache>>,
    session: Session,
) -> AppResult<Response> {
    let selected = category
        .as_deref()
        .filter(|c| *c != "all")
        .and_then(Category::parse);

    let problems = cache
        .get_or_fetch(QueryKey::Problems(selected), || {
            store::list_problems(&db_pool, selected)
        })
        .await?;

    let user = session::current_profile(&session, &db_pool).await?;

    let cards = if problems.is_empty() {
        let message = match selected {
            Some(_) => "No problems in this category yet. Be the first to post one!",
            None => "No problems have been posted yet. Be the first to share a challenge!",
        };
        format!(r#"<p class="empty-state">{message}</p>"#)
    } else {
        problems.iter().map(super::card).collect()
    };

    let mut options = String::from(r#"<option value="all">All Categories</option>"#);
    for c in Category::ALL {
        let chosen = if selected == Some(c) { " selected" } else { "" };
        options += &format!(r#"<option value="{}"{chosen}>{}</option>"#, c, c.label());
    }

    let post_link = if user.is_some() {
        r#"<a class="button" href="/submit">Post a Problem</a>"#
    } else {
        r#"<a class="button" href="/auth?mode=signup">Sign Up to Post</a>"#
    };

    Ok(Html(
        include_res!(str, "/pages/problems/list.html")
            .replace("{nav}", &crate::res::navbar(user.as_ref()))
            .replace("{category_options}", &options)
            .replace("{post_link}", post_link)
            .replace("{problems}", &cards),
    )
    .into_response())
}
