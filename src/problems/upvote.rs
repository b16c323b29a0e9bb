use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    cache::{Mutation, QueryCache},
    include_res, session, store, AppResult, AppState,
};

#[derive(Deserialize)]
pub(crate) struct UpvoteForm {
    /// The presence the client observed when it rendered the control. Two
    /// rapid toggles from different sessions can race; the store's uniqueness
    /// constraint is the backstop.
    pub(crate) has_upvoted: bool,
}

#[debug_handler(state = AppState)]
pub(crate) async fn toggle(
    Path(solution_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(cache): State<Arc<QueryCache>>,
    session: Session,
    Form(UpvoteForm { has_upvoted }): Form<UpvoteForm>,
) -> AppResult<Response> {
    let user_id = session::require_user_id(&session).await?;

    // The parent problem comes from the store, never from the form.
    let Some(problem_id) = store::solution_problem_id(&db_pool, solution_id).await? else {
        let body = include_res!(str, "/pages/notice.html")
            .replace("{title}", "Solution not found")
            .replace("{message}", "This solution may have been removed or doesn't exist.");
        return Ok((StatusCode::NOT_FOUND, Html(body)).into_response());
    };

    let now_upvoted = store::toggle_upvote(&db_pool, user_id, solution_id, has_upvoted).await?;
    cache.invalidate(Mutation::UpvoteToggled { problem_id, user_id }).await;
    tracing::debug!(solution = %solution_id, upvoted = now_upvoted, "upvote toggled");

    Ok(Redirect::to(&format!("/problems/{problem_id}")).into_response())
}
