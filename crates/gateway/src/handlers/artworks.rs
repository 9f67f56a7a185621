//! Artwork listing handlers
//!
//! `GET /artworks` serves two contracts: a unified page of artworks, or raw
//! Met records when `ids` is given.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use curatly_common::{
    errors::{AppError, Result},
    Provider,
};
use curatly_search::{pagination::parse_ids, providers::Department, ArtworksQuery};
use serde::Deserialize;

use crate::AppState;

/// Query parameters for `GET /artworks`.
///
/// Kept as strings so malformed numbers map to our own error messages.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworksParams {
    pub query: Option<String>,
    pub department_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub provider: Option<String>,
    pub ids: Option<String>,
}

/// List artworks, or fetch Met records by id
pub async fn list_artworks(
    State(state): State<AppState>,
    Query(params): Query<ArtworksParams>,
) -> Result<Response> {
    if let Some(ref ids) = params.ids {
        return artworks_by_ids(&state, ids).await;
    }

    let request = artworks_query(&state, &params)?;

    let envelope = state
        .search
        .page(&request)
        .await
        .map_err(|e| e.or_public("Failed to fetch artworks"))?;

    Ok(Json(envelope).into_response())
}

async fn artworks_by_ids(state: &AppState, raw: &str) -> Result<Response> {
    let ids = parse_ids(raw, state.config.museums.met.max_ids_per_request);

    if ids.is_empty() {
        return Err(AppError::InvalidFormat {
            message: "No valid IDs provided".to_string(),
        });
    }

    let artworks = state
        .met
        .fetch_by_ids(&ids, None)
        .await
        .map_err(|e| e.or_public("Failed to fetch artworks"))?;

    tracing::debug!(requested = ids.len(), found = artworks.len(), "Met artworks by id");

    Ok(Json(artworks).into_response())
}

fn artworks_query(state: &AppState, params: &ArtworksParams) -> Result<ArtworksQuery> {
    let defaults = &state.config.search;

    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(defaults.default_query.as_str())
        .to_string();

    let page = parse_number(params.page.as_deref(), 1)?;
    let limit = parse_number(params.limit.as_deref(), defaults.default_limit)?;

    let provider = match params.provider.as_deref().map(str::trim) {
        None | Some("") => Provider::Met,
        Some(provider) => provider.parse::<Provider>()?,
    };

    // The Met filters by department; a malformed id is treated as no filter
    let department_id = params
        .department_id
        .as_deref()
        .and_then(|id| id.trim().parse::<u32>().ok())
        .filter(|_| provider == Provider::Met);

    Ok(ArtworksQuery {
        query,
        department_id,
        provider,
        page,
        limit,
    })
}

fn parse_number(raw: Option<&str>, default: u32) -> Result<u32> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| AppError::InvalidPagination),
    }
}

/// List Met departments
pub async fn list_departments(State(state): State<AppState>) -> Result<Json<Vec<Department>>> {
    let departments = state
        .met
        .departments()
        .await
        .map_err(|e| e.or_public("Failed to fetch departments"))?;

    Ok(Json(departments))
}
