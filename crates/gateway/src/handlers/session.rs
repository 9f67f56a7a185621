//! Session handler

use axum::{extract::State, Json};
use curatly_common::{errors::Result, Session};

use crate::AppState;

/// Resolve the caller's session, preferring the saved profile's display name
pub async fn current_session(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Session>> {
    let Some(user_id) = session.user_id() else {
        return Ok(Json(session));
    };

    let display_name = state
        .repo
        .find_profile(user_id)
        .await?
        .and_then(|profile| profile.display_name);

    Ok(Json(session.with_display_name(display_name)))
}
