//! Curatly Common Library
//!
//! Shared code for the Curatly services including:
//! - Unified artwork types and provider identifiers
//! - Database entities and the persistence repository
//! - Error types and handling
//! - Configuration management
//! - Session resolution from the hosted auth backend
//! - Metrics and observability

pub mod artwork;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use artwork::{ArtworkId, Provider, UnifiedArtwork};
pub use auth::Session;
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Artist shown when a provider record has none
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
