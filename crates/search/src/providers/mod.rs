//! Museum API adapters
//!
//! Each provider sits behind a trait so the pagination orchestrator can be
//! exercised against in-memory sources:
//! - [`MetSource`]: numeric ids from a search call, records fetched one by one
//! - [`AicSource`]: server-side pagination, partial records in a single call

mod aic;
mod met;
#[cfg(test)]
mod stub;

pub use aic::{AicArtwork, AicClient, AicPagination, AicSearchPage, AicThumbnail};
pub use met::{Department, MetArtwork, MetClient};

use async_trait::async_trait;
use curatly_common::Result;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;

/// Metropolitan Museum of Art collection API
#[async_trait]
pub trait MetSource: Send + Sync {
    /// Ids of every artwork with an image matching the query, in API order
    async fn search(&self, query: &str, department_id: Option<u32>) -> Result<Vec<u64>>;

    /// Fetch up to `limit` of the given ids concurrently.
    ///
    /// Ids that cannot be fetched are skipped; the rest keep their relative order.
    async fn fetch_by_ids(&self, ids: &[u64], limit: Option<usize>) -> Result<Vec<MetArtwork>>;

    /// Curatorial departments usable as a search filter
    async fn departments(&self) -> Result<Vec<Department>>;
}

/// Art Institute of Chicago API
#[async_trait]
pub trait AicSource: Send + Sync {
    /// One page of search results with the provider's own pagination metadata
    async fn search(&self, query: &str, page: u32, limit: u32) -> Result<AicSearchPage>;
}

/// Read an optional record field, treating a null or wrong-typed value as absent.
///
/// Museum records are untrusted; one odd field must not cost the whole record.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}
