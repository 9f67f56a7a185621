//! Metropolitan Museum of Art collection API client
//!
//! Search returns ids only, so every record costs a second request.
//! None of the calls here fail the caller: rate limiting is retried,
//! anything else degrades to an empty result and a warning.

use super::{lenient, MetSource};
use async_trait::async_trait;
use curatly_common::config::MetConfig;
use curatly_common::errors::{AppError, Result};
use curatly_common::metrics;
use futures::future::join_all;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const PROVIDER: &str = "met";

/// Wildcard used when the search text is blank
const MATCH_ALL: &str = "*";

/// Longest single wait between rate-limited search attempts
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Wait before retry `attempt` (zero-based): `base * 2^attempt`, capped
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    2_u32
        .checked_pow(attempt)
        .and_then(|factor| base.checked_mul(factor))
        .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
}

/// Artwork record as returned by `/objects/{id}`.
///
/// Only `objectID` is required. Every other field may be missing, null or of
/// an unexpected type, in which case it reads as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetArtwork {
    #[serde(rename = "objectID")]
    pub object_id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub artist_display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub artist_display_bio: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub object_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub medium: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub culture: Option<String>,
    /// Full-size image
    #[serde(default, deserialize_with = "lenient")]
    pub primary_image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub primary_image_small: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub additional_images: Option<Vec<String>>,
    /// Page on metmuseum.org
    #[serde(rename = "objectURL", default, deserialize_with = "lenient")]
    pub object_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub credit_line: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub dimensions: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub classification: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub repository: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub department_id: u32,
    pub display_name: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    /// Null when nothing matched
    #[serde(rename = "objectIDs")]
    object_ids: Option<Vec<u64>>,
}

#[derive(Deserialize)]
struct DepartmentsResponse {
    #[serde(default)]
    departments: Vec<Department>,
}

/// HTTP client for the Met collection API
pub struct MetClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl MetClient {
    pub fn new(config: &MetConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("curatly/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    fn search_url(&self, query: &str, department_id: Option<u32>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/search", self.base_url)).map_err(|e| {
            AppError::Configuration {
                message: format!("Invalid Met base URL: {}", e),
            }
        })?;

        {
            let mut params = url.query_pairs_mut();
            let query = query.trim();
            params.append_pair("q", if query.is_empty() { MATCH_ALL } else { query });
            params.append_pair("hasImages", "true");
            if let Some(department_id) = department_id {
                params.append_pair("departmentId", &department_id.to_string());
            }
        }

        Ok(url)
    }

    /// Run a search, retrying while the API reports rate limiting
    async fn search_with_retry(&self, url: &Url) -> Result<Vec<u64>> {
        let mut attempt = 0;

        loop {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            metrics::record_upstream(PROVIDER, "search", status.as_u16());

            if status == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                let delay = retry_delay(self.retry_base_delay, attempt);
                warn!(
                    attempt = attempt + 1,
                    max_retries = self.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Met search rate limited, retrying"
                );
                metrics::record_retry(PROVIDER);
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                return Err(AppError::Upstream {
                    service: PROVIDER.to_string(),
                    message: format!("search returned {}", status),
                });
            }

            let body: SearchResponse = response.json().await?;
            return Ok(body.object_ids.unwrap_or_default());
        }
    }

    /// Fetch one record; absent when it 404s or cannot be read
    async fn fetch_one(&self, id: u64) -> Option<MetArtwork> {
        let url = format!("{}/objects/{}", self.base_url, id);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(object_id = id, error = %e, "Met object request failed");
                return None;
            }
        };

        let status = response.status();
        metrics::record_upstream(PROVIDER, "object", status.as_u16());

        if status == StatusCode::NOT_FOUND {
            debug!(object_id = id, "Met object not found");
            return None;
        }

        if !status.is_success() {
            warn!(object_id = id, status = %status, "Met object request rejected");
            return None;
        }

        match response.json::<MetArtwork>().await {
            Ok(artwork) => Some(artwork),
            Err(e) => {
                warn!(object_id = id, error = %e, "Unreadable Met object");
                None
            }
        }
    }
}

#[async_trait]
impl MetSource for MetClient {
    async fn search(&self, query: &str, department_id: Option<u32>) -> Result<Vec<u64>> {
        let url = self.search_url(query, department_id)?;

        match self.search_with_retry(&url).await {
            Ok(ids) => {
                debug!(query = %query, department_id = ?department_id, count = ids.len(), "Met search");
                Ok(ids)
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Met search failed, returning no results");
                Ok(Vec::new())
            }
        }
    }

    async fn fetch_by_ids(&self, ids: &[u64], limit: Option<usize>) -> Result<Vec<MetArtwork>> {
        let ids = &ids[..limit.unwrap_or(ids.len()).min(ids.len())];

        let artworks = join_all(ids.iter().map(|id| self.fetch_one(*id)))
            .await
            .into_iter()
            .flatten()
            .collect();

        Ok(artworks)
    }

    async fn departments(&self) -> Result<Vec<Department>> {
        let url = format!("{}/departments", self.base_url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Met departments request failed");
                return Ok(Vec::new());
            }
        };

        metrics::record_upstream(PROVIDER, "departments", response.status().as_u16());

        if !response.status().is_success() {
            warn!(status = %response.status(), "Met departments request rejected");
            return Ok(Vec::new());
        }

        match response.json::<DepartmentsResponse>().await {
            Ok(body) => Ok(body.departments),
            Err(e) => {
                warn!(error = %e, "Unreadable Met departments");
                Ok(Vec::new())
            }
        }
    }
}
