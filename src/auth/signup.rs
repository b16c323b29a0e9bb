use axum::{
    debug_handler,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    session::USER_ID,
    store,
    validate::{validate_account, AccountForm},
    AppError, AppResult,
};

use super::login::render_auth_page;

#[derive(Deserialize)]
pub(crate) struct SignupForm {
    pub(crate) email: String,
    pub(crate) password: String,
    #[serde(default)]
    pub(crate) display_name: String,
}

#[debug_handler]
pub(crate) async fn signup(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(SignupForm { email, password, display_name }): Form<SignupForm>,
) -> AppResult<Response> {
    let display_name = display_name.trim();
    let display_name = (!display_name.is_empty()).then_some(display_name);

    let form = AccountForm { email: &email, password: &password, display_name };
    if let Err(errors) = validate_account(&form) {
        return Ok(
            render_auth_page(true, &email, display_name.unwrap_or(""), &errors)
                .into_response(),
        );
    }

    let password_hash = super::hash_password(&password);
    let user_id = match store::create_profile(&db_pool, &email, &password_hash, display_name).await
    {
        Ok(id) => id,
        Err(err)
            if err
                .as_database_error()
                .is_some_and(|e| e.is_unique_violation()) =>
        {
            return Err(AppError::Auth(
                "This email is already registered. Please sign in instead.".to_owned(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    session.insert(USER_ID, user_id).await?;
    tracing::info!(%user_id, "account created");

    Ok(Redirect::to("/").into_response())
}
