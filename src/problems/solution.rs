use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    cache::{Mutation, QueryCache},
    session, store, AppResult, AppState,
};

#[derive(Deserialize)]
pub(crate) struct SolutionForm {
    pub(crate) content: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn post_solution(
    Path(problem_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(cache): State<Arc<QueryCache>>,
    session: Session,
    Form(SolutionForm { content }): Form<SolutionForm>,
) -> AppResult<Response> {
    let user_id = session::require_user_id(&session).await?;

    let content = content.trim();
    if content.is_empty() {
        return Ok(Redirect::to(&format!("/problems/{problem_id}")).into_response());
    }

    let id = store::insert_solution(&db_pool, problem_id, user_id, content).await?;
    cache.invalidate(Mutation::SolutionPosted { problem_id }).await;
    tracing::info!(solution = %id, problem = %problem_id, "solution submitted");

    Ok(Redirect::to(&format!("/problems/{problem_id}")).into_response())
}
