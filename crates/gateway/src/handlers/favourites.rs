//! Favourite handlers
//!
//! Favourites are keyed by the unified artwork id ("met-436535") per user.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use curatly_common::{
    db::models::Favourite,
    errors::{AppError, Result},
    ArtworkId, Session, UnifiedArtwork,
};

use crate::extract::{ApiJson, ApiPath};
use crate::AppState;

/// List the caller's favourites, newest first
pub async fn list_favourites(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Favourite>>> {
    let user_id = session.require_user()?;
    Ok(Json(state.repo.list_favourites(user_id).await?))
}

/// Save an artwork as a favourite
pub async fn add_favourite(
    State(state): State<AppState>,
    session: Session,
    ApiJson(artwork): ApiJson<UnifiedArtwork>,
) -> Result<(StatusCode, Json<Favourite>)> {
    let user_id = session.require_user()?;

    if artwork.id.provider != artwork.provider {
        return Err(AppError::Validation {
            message: "Artwork id does not match its provider".to_string(),
            field: Some("provider".to_string()),
        });
    }

    let favourite = state.repo.add_favourite(user_id, &artwork).await?;

    tracing::info!(user_id = %user_id, object_id = %artwork.id, "Favourite added");

    Ok((StatusCode::CREATED, Json(favourite)))
}

/// Get the caller's favourite for an artwork, 404 if it is not a favourite
pub async fn get_favourite(
    State(state): State<AppState>,
    session: Session,
    ApiPath(object_id): ApiPath<String>,
) -> Result<Json<Favourite>> {
    let user_id = session.require_user()?;
    let object_id: ArtworkId = object_id.parse()?;

    let favourite = state
        .repo
        .find_favourite(user_id, &object_id.to_string())
        .await?
        .ok_or_else(|| AppError::FavouriteNotFound {
            id: object_id.to_string(),
        })?;

    Ok(Json(favourite))
}

/// Remove an artwork from the caller's favourites
pub async fn remove_favourite(
    State(state): State<AppState>,
    session: Session,
    ApiPath(object_id): ApiPath<String>,
) -> Result<StatusCode> {
    let user_id = session.require_user()?;
    let object_id: ArtworkId = object_id.parse()?;

    if !state.repo.remove_favourite(user_id, &object_id.to_string()).await? {
        return Err(AppError::FavouriteNotFound {
            id: object_id.to_string(),
        });
    }

    tracing::info!(user_id = %user_id, object_id = %object_id, "Favourite removed");

    Ok(StatusCode::NO_CONTENT)
}
