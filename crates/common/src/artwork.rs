//! Provider-agnostic artwork types
//!
//! Every record coming out of a museum adapter is converted into a
//! [`UnifiedArtwork`] before it reaches a handler. The artwork id encodes
//! both the provider and the provider's native numeric id, which keeps ids
//! unique across collections.

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// External museum collection an artwork comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Metropolitan Museum of Art (two-phase id search)
    Met,
    /// Art Institute of Chicago (server-side pagination)
    Aic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Met => "met",
            Provider::Aic => "aic",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "met" => Ok(Provider::Met),
            "aic" => Ok(Provider::Aic),
            other => Err(AppError::UnknownProvider {
                provider: other.to_string(),
            }),
        }
    }
}

/// Globally unique artwork id, rendered as `"<provider>-<native id>"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtworkId {
    pub provider: Provider,
    pub native_id: u64,
}

impl ArtworkId {
    pub fn new(provider: Provider, native_id: u64) -> Self {
        Self { provider, native_id }
    }

    pub fn met(native_id: u64) -> Self {
        Self::new(Provider::Met, native_id)
    }

    pub fn aic(native_id: u64) -> Self {
        Self::new(Provider::Aic, native_id)
    }
}

impl fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.provider, self.native_id)
    }
}

impl FromStr for ArtworkId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidFormat {
            message: format!("Invalid artwork id: {}", s),
        };

        let (prefix, native) = s.split_once('-').ok_or_else(invalid)?;
        let provider = prefix.parse::<Provider>().map_err(|_| invalid())?;
        let native_id = native.parse::<u64>().map_err(|_| invalid())?;

        Ok(Self { provider, native_id })
    }
}

impl TryFrom<String> for ArtworkId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArtworkId> for String {
    fn from(id: ArtworkId) -> Self {
        id.to_string()
    }
}

/// Common artwork shape used by presentation and persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedArtwork {
    pub id: ArtworkId,
    pub provider: Provider,
    pub title: String,
    pub artist: String,
    pub date: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub artwork_url: String,
}
