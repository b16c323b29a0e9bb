use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{db::Profile, store, AppResult};

pub const USER_ID: &str = "user_id";

/// The signed-in user's id, or None while signed out.
pub async fn current_user_id(session: &Session) -> AppResult<Option<Uuid>> {
    Ok(session.get::<Uuid>(USER_ID).await?)
}

/// The signed-in user's profile, for the navbar and ownership display.
pub async fn current_profile(
    session: &Session,
    pool: &SqlitePool,
) -> AppResult<Option<Profile>> {
    match current_user_id(session).await? {
        Some(id) => store::get_profile(pool, id).await,
        None => Ok(None),
    }
}

/// Like [`current_user_id`] but rejects signed-out requests.
pub async fn require_user_id(session: &Session) -> AppResult<Uuid> {
    current_user_id(session)
        .await?
        .ok_or(crate::AppError::Auth("You need to be signed in to do that.".to_owned()))
}
