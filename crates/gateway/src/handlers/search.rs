//! Met id search handler

use axum::{
    extract::{Query, State},
    Json,
};
use curatly_common::errors::{AppError, Result};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(rename = "objectIDs")]
    pub object_ids: Vec<u64>,
}

/// Ids of Met artworks with images matching `q`
pub async fn search_ids(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::MissingField {
            field: "q".to_string(),
            message: "Missing query parameter \"q\"".to_string(),
        })?;

    let object_ids = state
        .met
        .search(query, None)
        .await
        .map_err(|e| e.or_public("Failed to search artworks"))?;

    Ok(Json(SearchResponse { object_ids }))
}
