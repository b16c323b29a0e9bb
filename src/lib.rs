pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod pages;
pub mod problems;
pub mod res;
pub mod session;
pub mod store;
pub mod validate;

use std::sync::Arc;

use axum::{extract::FromRef, http::StatusCode, response::{Html, IntoResponse, Response}};
use sqlx::SqlitePool;

use crate::cache::QueryCache;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub cache: Arc<QueryCache>,
}

pub type AppResult<T> = Result<T, AppError>;

/// Failure taxonomy for handlers. Validation failures never become an
/// `AppError`; the view layer renders them back into the form.
#[derive(Debug)]
pub enum AppError {
    /// Missing or rejected credentials.
    Auth(String),
    /// Store or infrastructure failure, surfaced with its message.
    Remote(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title, message) = match self {
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, "Sign in required", msg),
            AppError::Remote(err) => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong", err.to_string())
            }
        };

        let body = crate::include_res!(str, "/pages/notice.html")
            .replace("{title}", title)
            .replace("{message}", &res::escape_html(&message));
        (status, Html(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self::Remote(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self::Remote(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Remote(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(serde_json::Error);
apperr_impl!(sqlx::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(axum::Error);
apperr_impl!(anyhow::Error);
