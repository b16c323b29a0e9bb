use std::sync::Arc;

use axum::{
    debug_handler,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    cache::{Mutation, QueryCache},
    db::Category,
    include_res, res, session, store,
    validate::{validate_problem, FieldErrors, ProblemForm},
    AppResult, AppState,
};

#[derive(Deserialize)]
pub(crate) struct NewProblemForm {
    pub(crate) title: String,
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) category: String,
}

#[debug_handler]
pub async fn submit_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_profile(&session, &db_pool).await? else {
        return Ok(Redirect::to("/auth?mode=signup").into_response());
    };

    Ok(render_submit_page(&user, "", "", "", &FieldErrors::new()).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    State(cache): State<Arc<QueryCache>>,
    session: Session,
    Form(NewProblemForm { title, description, category }): Form<NewProblemForm>,
) -> AppResult<Response> {
    let user_id = session::require_user_id(&session).await?;

    let title = title.trim();
    let description = description.trim();
    let form = ProblemForm { title, description, category: &category };
    let parsed = match validate_problem(&form) {
        Ok(category) => category,
        Err(errors) => {
            let user = session::current_profile(&session, &db_pool)
                .await?
                .ok_or(crate::AppError::Auth("Session expired.".to_owned()))?;
            return Ok(render_submit_page(&user, title, description, &category, &errors)
                .into_response());
        }
    };

    let id = store::insert_problem(&db_pool, user_id, title, description, parsed).await?;
    cache.invalidate(Mutation::ProblemPosted).await;
    tracing::info!(problem = %id, category = %parsed, "problem posted");

    Ok(Redirect::to(&format!("/problems/{id}")).into_response())
}

fn render_submit_page(
    user: &crate::db::Profile,
    title: &str,
    description: &str,
    category: &str,
    errors: &FieldErrors,
) -> Html<String> {
    let placeholder_selected = if category.is_empty() { " selected" } else { "" };
    let mut options =
        format!(r#"<option value="" disabled{placeholder_selected}>Select a category</option>"#);
    for c in Category::ALL {
        let chosen = if category == c.as_str() { " selected" } else { "" };
        options += &format!(r#"<option value="{}"{chosen}>{}</option>"#, c, c.label());
    }

    Html(
        include_res!(str, "/pages/problems/submit.html")
            .replace("{nav}", &res::navbar(Some(user)))
            .replace("{title}", &res::escape_html(title))
            .replace("{title_error}", &res::field_error(errors, "title"))
            .replace("{description}", &res::escape_html(description))
            .replace("{description_error}", &res::field_error(errors, "description"))
            .replace("{category_options}", &options)
            .replace("{category_error}", &res::field_error(errors, "category")),
    )
}
