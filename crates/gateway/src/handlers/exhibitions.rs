//! Exhibition handlers
//!
//! Anyone may view an exhibition; only its owner may change it or its
//! artworks. Artworks are the owner's favourites, placed by position.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use curatly_common::{
    db::{
        models::{Exhibition, ExhibitionFavourite},
        ExhibitionArtwork, ExhibitionSummary,
    },
    errors::{AppError, Result},
    Session,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::extract::{ApiJson, ApiPath};
use crate::AppState;

/// Shown when "create & add" created the exhibition but the add step failed
pub const CREATED_WITHOUT_FAVOURITE: &str = "Created exhibition, but failed to add favourite.";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExhibitionRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    /// Favourite to add straight after creation
    pub favourite_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExhibitionRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddArtworkRequest {
    pub favourite_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub favourite_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExhibitionResponse {
    pub exhibition: Exhibition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership: Option<ExhibitionFavourite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionDetail {
    #[serde(flatten)]
    pub exhibition: Exhibition,
    pub artworks: Vec<ExhibitionArtwork>,
}

/// Trim text fields; a blank description becomes none
fn normalize(name: &str, description: Option<String>) -> (String, Option<String>) {
    let description = description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    (name.trim().to_string(), description)
}

/// List the caller's exhibitions, newest first
pub async fn list_exhibitions(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<ExhibitionSummary>>> {
    let user_id = session.require_user()?;
    Ok(Json(state.repo.list_exhibitions(user_id).await?))
}

/// Create an exhibition, optionally adding a favourite to it
pub async fn create_exhibition(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<CreateExhibitionRequest>,
) -> Result<(StatusCode, Json<CreateExhibitionResponse>)> {
    let user_id = session.require_user()?;

    let (name, description) = normalize(&request.name, request.description);
    let request = CreateExhibitionRequest {
        name,
        description,
        favourite_id: request.favourite_id,
    };
    request.validate()?;

    let exhibition = state
        .repo
        .create_exhibition(user_id, &request.name, request.description.clone())
        .await?;

    tracing::info!(user_id = %user_id, exhibition_id = %exhibition.id, "Exhibition created");

    let (membership, warning) = match request.favourite_id {
        None => (None, None),
        Some(favourite_id) => match add_owned_favourite(&state, exhibition.id, favourite_id, user_id).await {
            Ok(membership) => (Some(membership), None),
            Err(e) => {
                tracing::warn!(
                    exhibition_id = %exhibition.id,
                    favourite_id = %favourite_id,
                    error = %e,
                    "Created exhibition without its first favourite"
                );
                (None, Some(CREATED_WITHOUT_FAVOURITE.to_string()))
            }
        },
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateExhibitionResponse {
            exhibition,
            membership,
            warning,
        }),
    ))
}

/// Get an exhibition with its artworks in order
pub async fn get_exhibition(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ExhibitionDetail>> {
    let exhibition = state
        .repo
        .find_exhibition(id)
        .await?
        .ok_or_else(|| AppError::ExhibitionNotFound { id: id.to_string() })?;

    let artworks = state.repo.exhibition_artworks(id).await?;

    Ok(Json(ExhibitionDetail {
        exhibition,
        artworks,
    }))
}

/// Rename or re-describe an exhibition
pub async fn update_exhibition(
    State(state): State<AppState>,
    session: Session,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateExhibitionRequest>,
) -> Result<Json<Exhibition>> {
    let user_id = session.require_user()?;

    let (name, description) = normalize(&request.name, request.description);
    let request = UpdateExhibitionRequest { name, description };
    request.validate()?;

    let exhibition = state
        .repo
        .update_exhibition(id, user_id, &request.name, request.description)
        .await?;

    Ok(Json(exhibition))
}

/// Delete an exhibition
pub async fn delete_exhibition(
    State(state): State<AppState>,
    session: Session,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode> {
    let user_id = session.require_user()?;

    state.repo.delete_exhibition(id, user_id).await?;

    tracing::info!(user_id = %user_id, exhibition_id = %id, "Exhibition deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Add one of the caller's favourites to the end of an exhibition
pub async fn add_artwork(
    State(state): State<AppState>,
    session: Session,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AddArtworkRequest>,
) -> Result<(StatusCode, Json<ExhibitionFavourite>)> {
    let user_id = session.require_user()?;

    state.repo.find_owned_exhibition(id, user_id).await?;
    let membership = add_owned_favourite(&state, id, request.favourite_id, user_id).await?;

    Ok((StatusCode::CREATED, Json(membership)))
}

/// Take a favourite out of an exhibition
pub async fn remove_artwork(
    State(state): State<AppState>,
    session: Session,
    ApiPath((id, favourite_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    let user_id = session.require_user()?;

    state.repo.find_owned_exhibition(id, user_id).await?;

    if !state.repo.remove_from_exhibition(id, favourite_id).await? {
        return Err(AppError::FavouriteNotFound {
            id: favourite_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Set the order of an exhibition's artworks
pub async fn reorder_artworks(
    State(state): State<AppState>,
    session: Session,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ReorderRequest>,
) -> Result<Json<Vec<ExhibitionArtwork>>> {
    let user_id = session.require_user()?;

    state.repo.find_owned_exhibition(id, user_id).await?;
    state.repo.reorder_exhibition(id, &request.favourite_ids).await?;

    Ok(Json(state.repo.exhibition_artworks(id).await?))
}

/// Add a favourite after checking it belongs to `user_id`
async fn add_owned_favourite(
    state: &AppState,
    exhibition_id: Uuid,
    favourite_id: Uuid,
    user_id: Uuid,
) -> Result<ExhibitionFavourite> {
    let favourite = state
        .repo
        .find_favourite_by_id(favourite_id)
        .await?
        .ok_or_else(|| AppError::FavouriteNotFound {
            id: favourite_id.to_string(),
        })?;

    if favourite.user_id != user_id {
        return Err(AppError::Forbidden {
            message: "You can only add your own favourites.".to_string(),
        });
    }

    state.repo.add_to_exhibition(exhibition_id, favourite_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let (name, description) = normalize("  Blue period ", Some("   ".into()));
        assert_eq!(name, "Blue period");
        assert_eq!(description, None);
    }

    #[test]
    fn test_validation() {
        let request = CreateExhibitionRequest {
            name: String::new(),
            description: None,
            favourite_id: None,
        };
        assert!(request.validate().is_err());

        let request = UpdateExhibitionRequest {
            name: "x".repeat(201),
            description: None,
        };
        assert!(request.validate().is_err());

        let request = UpdateExhibitionRequest {
            name: "Still lifes".into(),
            description: Some("Fruit, flowers and skulls".into()),
        };
        assert!(request.validate().is_ok());
    }
}
