//! Unified pagination over both museum providers
//!
//! Callers always see `{page, limit} -> {artworks, total, page, totalPages}`.
//! Behind that contract the providers differ:
//!
//! - **Met**: search yields the full id list, so pages are cut client-side.
//!   The requested page is clamped into range. Records are fetched in small
//!   sequential sub-batches until the page is full, the ids run out, or the
//!   attempt cap (`limit * met_attempt_factor` sub-batches) is hit. A page can
//!   therefore come back short when many ids in a row fail to resolve.
//! - **AIC**: one call, pagination metadata taken as is. A page past the last
//!   one is a client error rather than being clamped, and invalid records are
//!   dropped, which can also shorten a page.

use crate::providers::{AicSource, MetSource};
use crate::unify::{aic_to_unified, met_to_unified, AicAssets};
use curatly_common::config::SearchConfig;
use curatly_common::errors::{AppError, Result};
use curatly_common::{metrics, Provider, UnifiedArtwork};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// A request for one page of artworks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworksQuery {
    pub query: String,
    /// Met only; ignored for AIC
    pub department_id: Option<u32>,
    pub provider: Provider,
    /// 1-based
    pub page: u32,
    pub limit: u32,
}

/// Page envelope returned regardless of provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    pub artworks: Vec<UnifiedArtwork>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

/// Search orchestrator
#[derive(Clone)]
pub struct ArtworkSearch {
    met: Arc<dyn MetSource>,
    aic: Arc<dyn AicSource>,
    batch_size: usize,
    attempt_factor: usize,
}

impl ArtworkSearch {
    pub fn new(met: Arc<dyn MetSource>, aic: Arc<dyn AicSource>, config: &SearchConfig) -> Self {
        Self {
            met,
            aic,
            batch_size: config.met_batch_size.max(1),
            attempt_factor: config.met_attempt_factor.max(1),
        }
    }

    /// Assemble one page of unified artworks
    pub async fn page(&self, request: &ArtworksQuery) -> Result<PageEnvelope> {
        if request.page < 1 || request.limit < 1 {
            return Err(AppError::InvalidPagination);
        }

        let start = Instant::now();

        let envelope = match request.provider {
            Provider::Met => {
                self.met_page(&request.query, request.department_id, request.page, request.limit)
                    .await?
            }
            Provider::Aic => {
                self.aic_page(&request.query, request.page, request.limit)
                    .await?
            }
        };

        metrics::record_search(
            start.elapsed().as_secs_f64(),
            request.provider.as_str(),
            envelope.artworks.len(),
        );

        info!(
            provider = %request.provider,
            query = %request.query,
            department_id = ?request.department_id,
            page = envelope.page,
            total_pages = envelope.total_pages,
            results = envelope.artworks.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Artworks page assembled"
        );

        Ok(envelope)
    }

    async fn met_page(
        &self,
        query: &str,
        department_id: Option<u32>,
        page: u32,
        limit: u32,
    ) -> Result<PageEnvelope> {
        let ids = self.met.search(query, department_id).await?;

        let total = ids.len() as u64;
        let total_pages = total_pages(total, limit);
        let page = clamp_page(page, total_pages);

        let limit = limit as usize;
        let max_attempts = limit.saturating_mul(self.attempt_factor);

        let mut artworks = Vec::with_capacity(limit.min(ids.len()));
        let mut index = (page as usize - 1).saturating_mul(limit);
        let mut attempts = 0;

        // Sub-batches run one after another to bound fan-out to the Met API
        while artworks.len() < limit && index < ids.len() && attempts < max_attempts {
            let end = (index + self.batch_size).min(ids.len());
            let batch = self.met.fetch_by_ids(&ids[index..end], None).await?;
            artworks.extend(batch.iter().map(met_to_unified));

            index = end;
            attempts += 1;
        }

        artworks.truncate(limit);

        Ok(PageEnvelope {
            artworks,
            total,
            page,
            total_pages,
        })
    }

    async fn aic_page(&self, query: &str, page: u32, limit: u32) -> Result<PageEnvelope> {
        let result = self.aic.search(query, page, limit).await?;
        let total_pages = result.pagination.total_pages;

        if total_pages > 0 && page > total_pages {
            return Err(AppError::PageOutOfRange { page, total_pages });
        }

        let assets = AicAssets::from(&result);
        let artworks = result
            .artworks
            .iter()
            .filter_map(|record| aic_to_unified(record, assets))
            .take(limit as usize)
            .collect();

        Ok(PageEnvelope {
            artworks,
            total: result.pagination.total,
            page,
            total_pages,
        })
    }
}

/// `ceil(total / limit)`, 0 when there is nothing to show
pub fn total_pages(total: u64, limit: u32) -> u32 {
    if total == 0 || limit == 0 {
        return 0;
    }
    total.div_ceil(limit as u64).min(u32::MAX as u64) as u32
}

/// Clamp a requested page into `1..=total_pages` (1 when there are no pages)
pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    if total_pages == 0 {
        1
    } else {
        page.clamp(1, total_pages)
    }
}

/// Parse a comma separated id list, dropping blank and non-numeric tokens
pub fn parse_ids(raw: &str, max: usize) -> Vec<u64> {
    raw.split(',')
        .filter_map(|token| token.trim().parse::<u64>().ok())
        .take(max)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{AicArtwork, AicPagination, AicSearchPage, Department, MetArtwork};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory Met collection; ids in `missing` behave like 404s
    struct MockMet {
        ids: Vec<u64>,
        missing: HashSet<u64>,
        batches: Mutex<Vec<Vec<u64>>>,
    }

    impl MockMet {
        fn new(count: u64) -> Self {
            Self {
                ids: (1..=count).collect(),
                missing: HashSet::new(),
                batches: Mutex::new(Vec::new()),
            }
        }

        fn with_missing(mut self, missing: impl IntoIterator<Item = u64>) -> Self {
            self.missing = missing.into_iter().collect();
            self
        }

        fn batches(&self) -> Vec<Vec<u64>> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MetSource for MockMet {
        async fn search(&self, _query: &str, _department_id: Option<u32>) -> Result<Vec<u64>> {
            Ok(self.ids.clone())
        }

        async fn fetch_by_ids(&self, ids: &[u64], limit: Option<usize>) -> Result<Vec<MetArtwork>> {
            let ids = &ids[..limit.unwrap_or(ids.len()).min(ids.len())];
            self.batches.lock().unwrap().push(ids.to_vec());

            Ok(ids
                .iter()
                .filter(|id| !self.missing.contains(id))
                .map(|id| {
                    serde_json::from_value(json!({ "objectID": id, "title": format!("Object {}", id) }))
                        .unwrap()
                })
                .collect())
        }

        async fn departments(&self) -> Result<Vec<Department>> {
            Ok(Vec::new())
        }
    }

    /// Serves a fixed AIC page, or fails like an upstream outage
    struct MockAic {
        records: Vec<AicArtwork>,
        total: u64,
        total_pages: u32,
        fail: bool,
    }

    #[async_trait]
    impl AicSource for MockAic {
        async fn search(&self, _query: &str, page: u32, limit: u32) -> Result<AicSearchPage> {
            if self.fail {
                return Err(AppError::Upstream {
                    service: "aic".into(),
                    message: "search returned 500".into(),
                });
            }

            Ok(AicSearchPage {
                artworks: self.records.clone(),
                pagination: AicPagination {
                    total: self.total,
                    limit,
                    offset: (page as u64 - 1) * limit as u64,
                    total_pages: self.total_pages,
                    current_page: page,
                },
                iiif_url: "https://www.artic.edu/iiif/2".into(),
                website_url: "https://www.artic.edu".into(),
                image_width: 843,
            })
        }
    }

    fn aic_record(id: serde_json::Value, title: serde_json::Value) -> AicArtwork {
        AicArtwork {
            id,
            title,
            ..Default::default()
        }
    }

    fn search(met: Arc<MockMet>, aic: MockAic) -> ArtworkSearch {
        ArtworkSearch::new(met, Arc::new(aic), &SearchConfig::default())
    }

    fn empty_aic() -> MockAic {
        MockAic {
            records: Vec::new(),
            total: 0,
            total_pages: 0,
            fail: false,
        }
    }

    fn met_query(page: u32, limit: u32) -> ArtworksQuery {
        ArtworksQuery {
            query: "art".into(),
            department_id: None,
            provider: Provider::Met,
            page,
            limit,
        }
    }

    fn aic_query(page: u32, limit: u32) -> ArtworksQuery {
        ArtworksQuery {
            provider: Provider::Aic,
            ..met_query(page, limit)
        }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(41, 20), 3);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(7, 0), 1);
        assert_eq!(clamp_page(7, 3), 3);
        assert_eq!(clamp_page(2, 3), 2);
    }

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("1,2,abc,", 50), vec![1, 2]);
        assert_eq!(parse_ids(" 7 , 8", 50), vec![7, 8]);
        assert!(parse_ids("abc,,", 50).is_empty());
        assert_eq!(parse_ids("1,2,3,4", 2), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_met_first_page() {
        let met = Arc::new(MockMet::new(45));
        let envelope = search(met.clone(), empty_aic()).page(&met_query(1, 20)).await.unwrap();

        assert_eq!(envelope.total, 45);
        assert_eq!(envelope.total_pages, 3);
        assert_eq!(envelope.page, 1);
        assert_eq!(envelope.artworks.len(), 20);
        assert!(envelope.artworks.iter().all(|a| a.provider == Provider::Met));

        // Four sequential sub-batches of five, in id order
        let batches = met.batches();
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[0], vec![1, 2, 3, 4, 5]);
        assert_eq!(batches[3], vec![16, 17, 18, 19, 20]);
    }

    #[tokio::test]
    async fn test_met_page_is_clamped() {
        let met = Arc::new(MockMet::new(45));
        let envelope = search(met, empty_aic()).page(&met_query(9, 20)).await.unwrap();

        assert_eq!(envelope.page, 3);
        assert_eq!(envelope.artworks.len(), 5);
        assert_eq!(envelope.artworks[0].id.to_string(), "met-41");
    }

    #[tokio::test]
    async fn test_met_no_results() {
        let met = Arc::new(MockMet::new(0));
        let envelope = search(met.clone(), empty_aic()).page(&met_query(4, 20)).await.unwrap();

        assert_eq!(envelope.total, 0);
        assert_eq!(envelope.total_pages, 0);
        assert_eq!(envelope.page, 1);
        assert!(envelope.artworks.is_empty());
        assert!(met.batches().is_empty());
    }

    #[tokio::test]
    async fn test_met_skips_missing_ids_in_order() {
        let met = Arc::new(MockMet::new(30).with_missing([2, 3, 9]));
        let envelope = search(met, empty_aic()).page(&met_query(1, 10)).await.unwrap();

        let ids: Vec<String> = envelope.artworks.iter().map(|a| a.id.to_string()).collect();
        assert_eq!(
            ids,
            ["met-1", "met-4", "met-5", "met-6", "met-7", "met-8", "met-10", "met-11", "met-12", "met-13"]
        );
    }

    #[tokio::test]
    async fn test_met_attempt_cap() {
        // Nothing resolves: limit 2 allows 2 * 3 sub-batches before giving up
        let met = Arc::new(MockMet::new(100).with_missing(1..=100));
        let envelope = search(met.clone(), empty_aic()).page(&met_query(1, 2)).await.unwrap();

        assert!(envelope.artworks.is_empty());
        assert_eq!(envelope.total, 100);
        assert_eq!(met.batches().len(), 6);
    }

    #[tokio::test]
    async fn test_invalid_pagination() {
        let met = Arc::new(MockMet::new(10));
        let search = search(met, empty_aic());

        assert!(matches!(
            search.page(&met_query(0, 20)).await,
            Err(AppError::InvalidPagination)
        ));
        assert!(matches!(
            search.page(&aic_query(1, 0)).await,
            Err(AppError::InvalidPagination)
        ));
    }

    #[tokio::test]
    async fn test_aic_page() {
        let aic = MockAic {
            records: vec![
                aic_record(json!(1), json!("Nighthawks")),
                aic_record(json!(2), serde_json::Value::Null),
                aic_record(serde_json::Value::Null, json!("No id")),
                aic_record(json!(3), json!("American Gothic")),
            ],
            total: 41,
            total_pages: 3,
            fail: false,
        };

        let envelope = search(Arc::new(MockMet::new(0)), aic)
            .page(&aic_query(2, 20))
            .await
            .unwrap();

        assert_eq!(envelope.total, 41);
        assert_eq!(envelope.total_pages, 3);
        assert_eq!(envelope.page, 2);
        assert_eq!(envelope.artworks.len(), 2);
        assert_eq!(envelope.artworks[1].artwork_url, "https://www.artic.edu/artworks/3");
    }

    #[tokio::test]
    async fn test_aic_page_never_exceeds_limit() {
        let aic = MockAic {
            records: (1..=5).map(|id| aic_record(json!(id), json!("Study"))).collect(),
            total: 5,
            total_pages: 2,
            fail: false,
        };

        let envelope = search(Arc::new(MockMet::new(0)), aic)
            .page(&aic_query(1, 3))
            .await
            .unwrap();

        assert_eq!(envelope.artworks.len(), 3);
    }

    #[tokio::test]
    async fn test_aic_page_out_of_range() {
        let aic = MockAic {
            records: Vec::new(),
            total: 41,
            total_pages: 3,
            fail: false,
        };

        let err = search(Arc::new(MockMet::new(0)), aic)
            .page(&aic_query(5, 20))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PageOutOfRange { page: 5, total_pages: 3 }));
        assert_eq!(err.to_string(), "Page number out of range");
    }

    #[tokio::test]
    async fn test_aic_without_pages_is_not_out_of_range() {
        let envelope = search(Arc::new(MockMet::new(0)), empty_aic())
            .page(&aic_query(5, 20))
            .await
            .unwrap();

        assert_eq!(envelope.page, 5);
        assert!(envelope.artworks.is_empty());
    }

    #[tokio::test]
    async fn test_aic_failure_propagates() {
        let aic = MockAic {
            fail: true,
            ..empty_aic()
        };

        let err = search(Arc::new(MockMet::new(0)), aic)
            .page(&aic_query(1, 20))
            .await
            .unwrap_err();

        assert!(err.is_server_error());
    }

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(PageEnvelope {
            artworks: Vec::new(),
            total: 0,
            page: 1,
            total_pages: 0,
        })
        .unwrap();

        assert_eq!(json, json!({ "artworks": [], "total": 0, "page": 1, "totalPages": 0 }));
    }
}
