//! Curatly Search Library
//!
//! Artwork discovery across the Met and AIC collections:
//! - Museum API adapters with rate-limit retry and partial-failure tolerance
//! - Unification of provider records into one artwork shape
//! - A single pagination contract over both providers
//! - Browsing state and its URL encoding

pub mod browse;
pub mod pagination;
pub mod providers;
pub mod unify;

pub use pagination::{ArtworkSearch, ArtworksQuery, PageEnvelope};
pub use providers::{AicClient, AicSource, MetClient, MetSource};
