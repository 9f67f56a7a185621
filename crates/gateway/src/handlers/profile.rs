//! Profile handlers

use axum::{extract::State, Json};
use curatly_common::{errors::Result, Session};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::extract::ApiJson;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub display_name: Option<String>,
}

/// Get the caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ProfileResponse>> {
    let user_id = session.require_user()?;

    let saved = state
        .repo
        .find_profile(user_id)
        .await?
        .and_then(|profile| profile.display_name);

    let display_name = match session.with_display_name(saved) {
        Session::Authenticated { display_name, .. } => display_name,
        Session::Anonymous => None,
    };

    Ok(Json(ProfileResponse {
        id: user_id,
        display_name,
    }))
}

/// Set the caller's display name
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    let user_id = session.require_user()?;

    let request = UpdateProfileRequest {
        display_name: request.display_name.trim().to_string(),
    };
    request.validate()?;

    let profile = state.repo.upsert_profile(user_id, &request.display_name).await?;

    tracing::info!(user_id = %user_id, "Profile updated");

    Ok(Json(ProfileResponse {
        id: profile.id,
        display_name: profile.display_name,
    }))
}
