use axum::{
    debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    include_res, res,
    session::USER_ID,
    store,
    validate::{validate_account, AccountForm, FieldErrors},
    AppError, AppResult,
};

#[derive(Deserialize)]
pub(crate) struct AuthPageQuery {
    pub(crate) mode: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[debug_handler]
pub(crate) async fn auth_page(
    Query(AuthPageQuery { mode }): Query<AuthPageQuery>,
    session: Session,
) -> AppResult<Response> {
    // Already signed in: nothing to do here.
    if session.get::<uuid::Uuid>(USER_ID).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let signup = mode.as_deref() == Some("signup");
    Ok(render_auth_page(signup, "", "", &FieldErrors::new()).into_response())
}

#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(LoginForm { email, password }): Form<LoginForm>,
) -> AppResult<Response> {
    let form = AccountForm { email: &email, password: &password, display_name: None };
    if let Err(errors) = validate_account(&form) {
        return Ok(render_auth_page(false, &email, "", &errors).into_response());
    }

    let Some((user_id, stored_hash)) = store::profile_by_email(&db_pool, &email).await? else {
        return Err(AppError::Auth("Please check your email and password.".to_owned()));
    };
    if !super::verify_password(&password, &stored_hash) {
        return Err(AppError::Auth("Please check your email and password.".to_owned()));
    }

    session.insert(USER_ID, user_id).await?;
    tracing::info!(%user_id, "signed in");

    Ok(Redirect::to("/").into_response())
}

pub(crate) fn render_auth_page(
    signup: bool,
    email: &str,
    display_name: &str,
    errors: &FieldErrors,
) -> Html<String> {
    let name_field = if signup {
        include_res!(str, "/pages/auth_name_field.html")
            .replace("{display_name}", &res::escape_html(display_name))
            .replace("{display_name_error}", &res::field_error(errors, "display_name"))
    } else {
        String::new()
    };

    let (heading, lede, action, button, switch) = if signup {
        (
            "Create your account",
            "Join the community and start solving problems",
            "/auth/signup",
            "Create Account",
            r#"Already have an account? <a href="/auth">Sign in</a>"#,
        )
    } else {
        (
            "Welcome back",
            "Sign in to continue to CrowdSolve",
            "/auth/login",
            "Sign In",
            r#"Don't have an account? <a href="/auth?mode=signup">Sign up</a>"#,
        )
    };

    Html(
        include_res!(str, "/pages/auth.html")
            .replace("{heading}", heading)
            .replace("{lede}", lede)
            .replace("{name_field}", &name_field)
            .replace("{email}", &res::escape_html(email))
            .replace("{email_error}", &res::field_error(errors, "email"))
            .replace("{password_error}", &res::field_error(errors, "password"))
            .replace("{action}", action)
            .replace("{button}", button)
            .replace("{switch}", switch),
    )
}
