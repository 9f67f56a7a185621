//! Art Institute of Chicago API client
//!
//! The search endpoint paginates server-side and returns partial records
//! together with the IIIF image service base URL.

use super::{lenient, AicSource};
use async_trait::async_trait;
use curatly_common::config::AicConfig;
use curatly_common::errors::{AppError, Result};
use curatly_common::metrics;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

const PROVIDER: &str = "aic";

/// Fields requested from the search endpoint
const SEARCH_FIELDS: &str = "id,title,artist_title,date_display,image_id,thumbnail";

/// Partial artwork record.
///
/// `id` and `title` are kept untyped: records where they are missing or of the
/// wrong type are dropped during unification. The remaining fields read as
/// `None` when missing or mistyped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AicArtwork {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub title: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub artist_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub date_display: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<AicThumbnail>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AicThumbnail {
    #[serde(default, deserialize_with = "lenient")]
    pub alt_text: Option<String>,
}

/// Pagination metadata, authoritative for AIC pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AicPagination {
    pub total: u64,
    pub limit: u32,
    pub offset: u64,
    pub total_pages: u32,
    pub current_page: u32,
}

/// One page of AIC search results
#[derive(Debug, Clone, PartialEq)]
pub struct AicSearchPage {
    pub artworks: Vec<AicArtwork>,
    pub pagination: AicPagination,
    /// IIIF image service base URL
    pub iiif_url: String,
    /// Public website, used to link to artwork pages
    pub website_url: String,
    /// Requested image width in pixels
    pub image_width: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<AicArtwork>,
    #[serde(default)]
    pagination: AicPagination,
    #[serde(default)]
    config: ResponseConfig,
}

#[derive(Default, Deserialize)]
struct ResponseConfig {
    iiif_url: Option<String>,
}

/// HTTP client for the AIC API
pub struct AicClient {
    client: reqwest::Client,
    base_url: String,
    default_iiif_url: String,
    website_url: String,
    image_width: u32,
}

impl AicClient {
    pub fn new(config: &AicConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("curatly/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_iiif_url: config.default_iiif_url.clone(),
            website_url: config.website_url.trim_end_matches('/').to_string(),
            image_width: config.image_width,
        })
    }

    fn search_url(&self, query: &str, page: u32, limit: u32) -> Result<Url> {
        let page = page.to_string();
        let limit = limit.to_string();

        Url::parse_with_params(
            &format!("{}/artworks/search", self.base_url),
            [
                ("q", query),
                ("page", page.as_str()),
                ("limit", limit.as_str()),
                ("fields", SEARCH_FIELDS),
            ],
        )
        .map_err(|e| AppError::Configuration {
            message: format!("Invalid AIC base URL: {}", e),
        })
    }

    fn into_page(&self, body: SearchResponse) -> AicSearchPage {
        let iiif_url = body
            .config
            .iiif_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.default_iiif_url.clone());

        AicSearchPage {
            artworks: body.data,
            pagination: body.pagination,
            iiif_url,
            website_url: self.website_url.clone(),
            image_width: self.image_width,
        }
    }
}

#[async_trait]
impl AicSource for AicClient {
    async fn search(&self, query: &str, page: u32, limit: u32) -> Result<AicSearchPage> {
        let url = self.search_url(query, page, limit)?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        metrics::record_upstream(PROVIDER, "search", status.as_u16());

        if !status.is_success() {
            return Err(AppError::Upstream {
                service: PROVIDER.to_string(),
                message: format!("search returned {}", status),
            });
        }

        let body: SearchResponse = response.json().await?;

        debug!(
            query = %query,
            page = page,
            total = body.pagination.total,
            records = body.data.len(),
            "AIC search"
        );

        Ok(self.into_page(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::stub::serve;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};

    fn client() -> AicClient {
        AicClient::new(&AicConfig::default()).unwrap()
    }

    #[test]
    fn test_search_url() {
        let url = client().search_url("vase", 5, 20).unwrap();
        assert_eq!(url.path(), "/api/v1/artworks/search");
        assert_eq!(
            url.query(),
            Some("q=vase&page=5&limit=20&fields=id%2Ctitle%2Cartist_title%2Cdate_display%2Cimage_id%2Cthumbnail")
        );
    }

    #[test]
    fn test_parse_search_response() {
        let body: SearchResponse = serde_json::from_str(
            r#"{
                "pagination": {"total": 41, "limit": 20, "offset": 0, "total_pages": 3, "current_page": 1},
                "data": [
                    {"id": 27992, "title": "A Sunday on La Grande Jatte", "artist_title": "Georges Seurat",
                     "date_display": "1884-86", "image_id": "2d484387", "thumbnail": {"alt_text": "Park scene"}},
                    {"id": 1, "title": null, "artist_title": null, "image_id": null, "thumbnail": null}
                ],
                "config": {"iiif_url": "https://www.artic.edu/iiif/2", "website_url": "http://www.artic.edu"}
            }"#,
        )
        .unwrap();

        let page = client().into_page(body);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.artworks.len(), 2);
        assert_eq!(page.artworks[1].title, Value::Null);
        assert_eq!(page.iiif_url, "https://www.artic.edu/iiif/2");
    }

    #[test]
    fn test_missing_iiif_url_falls_back() {
        let body: SearchResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        let page = client().into_page(body);

        assert_eq!(page.iiif_url, AicConfig::default().default_iiif_url);
        assert_eq!(page.pagination, AicPagination::default());
    }

    #[test]
    fn test_mistyped_optional_field_keeps_page() {
        let body: SearchResponse = serde_json::from_str(
            r#"{
                "data": [
                    {"id": 1, "title": "Nighthawks", "artist_title": "Edward Hopper"},
                    {"id": 2, "title": "The Bedroom", "date_display": 1890, "thumbnail": "none"}
                ]
            }"#,
        )
        .unwrap();

        let page = client().into_page(body);
        assert_eq!(page.artworks.len(), 2);
        assert_eq!(page.artworks[0].artist_title.as_deref(), Some("Edward Hopper"));
        assert_eq!(page.artworks[1].date_display, None);
        assert_eq!(page.artworks[1].thumbnail, None);
    }

    fn stub_client(base_url: String) -> AicClient {
        AicClient::new(&AicConfig {
            base_url,
            ..AicConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_against_server() {
        let router = Router::new().route(
            "/artworks/search",
            get(|| async {
                Json(serde_json::json!({
                    "pagination": {"total": 2, "limit": 20, "offset": 0, "total_pages": 1, "current_page": 1},
                    "data": [
                        {"id": 1, "title": "Nighthawks", "image_id": "831a05de"},
                        {"id": 2, "title": "The Bedroom", "date_display": 1890}
                    ],
                    "config": {"iiif_url": "https://iiif.example/2"}
                }))
            }),
        );
        let base_url = serve(router).await;

        let page = stub_client(base_url).search("night", 1, 20).await.unwrap();

        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.artworks.len(), 2);
        assert_eq!(page.iiif_url, "https://iiif.example/2");
    }

    #[tokio::test]
    async fn test_search_failure_is_upstream_error() {
        let router = Router::new().route(
            "/artworks/search",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base_url = serve(router).await;

        let err = stub_client(base_url).search("night", 1, 20).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
    }
}
