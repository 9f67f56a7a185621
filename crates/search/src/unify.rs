//! Conversion of provider records into [`UnifiedArtwork`]
//!
//! Both mappers are pure. The AIC mapper is the only validation gate in the
//! pipeline: a record without a numeric id and a string title is dropped.

use crate::providers::{AicArtwork, AicSearchPage, MetArtwork};
use curatly_common::{ArtworkId, Provider, UnifiedArtwork, UNKNOWN_ARTIST};

/// Default IIIF image width in pixels
pub const DEFAULT_IMAGE_WIDTH: u32 = 843;

/// Image and page locations needed to unify AIC records
#[derive(Debug, Clone, Copy)]
pub struct AicAssets<'a> {
    pub iiif_url: &'a str,
    pub website_url: &'a str,
    pub image_width: u32,
}

impl<'a> From<&'a AicSearchPage> for AicAssets<'a> {
    fn from(page: &'a AicSearchPage) -> Self {
        Self {
            iiif_url: &page.iiif_url,
            website_url: &page.website_url,
            image_width: page.image_width,
        }
    }
}

pub fn met_to_unified(record: &MetArtwork) -> UnifiedArtwork {
    UnifiedArtwork {
        id: ArtworkId::met(record.object_id),
        provider: Provider::Met,
        title: text(&record.title).unwrap_or_default().to_string(),
        artist: text(&record.artist_display_name)
            .unwrap_or(UNKNOWN_ARTIST)
            .to_string(),
        date: text(&record.object_date).unwrap_or_default().to_string(),
        image_url: text(&record.primary_image_small)
            .unwrap_or_default()
            .to_string(),
        description: text(&record.medium).map(String::from),
        artwork_url: text(&record.object_url).unwrap_or_default().to_string(),
    }
}

/// Returns `None` when the record has no usable id or title
pub fn aic_to_unified(record: &AicArtwork, assets: AicAssets<'_>) -> Option<UnifiedArtwork> {
    let native_id = record.id.as_u64()?;
    let title = record.title.as_str()?;

    let image_url = text(&record.image_id)
        .map(|image_id| aic_image_url(assets.iiif_url, image_id, assets.image_width))
        .unwrap_or_default();

    let description = record
        .thumbnail
        .as_ref()
        .and_then(|thumbnail| text(&thumbnail.alt_text))
        .map(String::from);

    Some(UnifiedArtwork {
        id: ArtworkId::aic(native_id),
        provider: Provider::Aic,
        title: title.to_string(),
        artist: text(&record.artist_title).unwrap_or(UNKNOWN_ARTIST).to_string(),
        date: text(&record.date_display).unwrap_or_default().to_string(),
        image_url,
        description,
        artwork_url: format!("{}/artworks/{}", assets.website_url.trim_end_matches('/'), native_id),
    })
}

/// IIIF URL for a full image scaled to `width`
pub fn aic_image_url(iiif_url: &str, image_id: &str, width: u32) -> String {
    format!(
        "{}/{}/full/{},/0/default.jpg",
        iiif_url.trim_end_matches('/'),
        image_id,
        width
    )
}

/// Trimmed text, `None` when blank
fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::AicThumbnail;
    use serde_json::json;

    const ASSETS: AicAssets<'static> = AicAssets {
        iiif_url: "https://www.artic.edu/iiif/2",
        website_url: "https://www.artic.edu",
        image_width: DEFAULT_IMAGE_WIDTH,
    };

    fn met_record() -> MetArtwork {
        serde_json::from_value(json!({
            "objectID": 436535,
            "title": "Wheat Field with Cypresses",
            "artistDisplayName": "Vincent van Gogh",
            "objectDate": "1889",
            "medium": "Oil on canvas",
            "primaryImageSmall": "https://images.metmuseum.org/CRDImages/ep/web-large/DT1567.jpg",
            "objectURL": "https://www.metmuseum.org/art/collection/search/436535"
        }))
        .unwrap()
    }

    fn aic_record() -> AicArtwork {
        AicArtwork {
            id: json!(27992),
            title: json!("A Sunday on La Grande Jatte"),
            artist_title: Some("Georges Seurat".into()),
            date_display: Some("1884-86".into()),
            image_id: Some("2d484387-2509-5e8e-2c43-22f9981972eb".into()),
            thumbnail: Some(AicThumbnail {
                alt_text: Some("Painting of people in a park".into()),
            }),
        }
    }

    #[test]
    fn test_met_mapping() {
        let artwork = met_to_unified(&met_record());

        assert_eq!(artwork.id.to_string(), "met-436535");
        assert_eq!(artwork.provider, Provider::Met);
        assert_eq!(artwork.artist, "Vincent van Gogh");
        assert_eq!(artwork.description.as_deref(), Some("Oil on canvas"));
        assert!(artwork.image_url.ends_with("DT1567.jpg"));
        assert_eq!(artwork.artwork_url, "https://www.metmuseum.org/art/collection/search/436535");
    }

    #[test]
    fn test_met_defaults() {
        let record: MetArtwork =
            serde_json::from_value(json!({ "objectID": 1, "artistDisplayName": "  " })).unwrap();
        let artwork = met_to_unified(&record);

        assert_eq!(artwork.artist, UNKNOWN_ARTIST);
        assert_eq!(artwork.image_url, "");
        assert_eq!(artwork.title, "");
        assert_eq!(artwork.description, None);
    }

    #[test]
    fn test_mapping_is_pure() {
        assert_eq!(met_to_unified(&met_record()), met_to_unified(&met_record()));
        assert_eq!(aic_to_unified(&aic_record(), ASSETS), aic_to_unified(&aic_record(), ASSETS));
    }

    #[test]
    fn test_aic_mapping() {
        let artwork = aic_to_unified(&aic_record(), ASSETS).unwrap();

        assert_eq!(artwork.id.to_string(), "aic-27992");
        assert_eq!(artwork.provider, Provider::Aic);
        assert_eq!(
            artwork.image_url,
            "https://www.artic.edu/iiif/2/2d484387-2509-5e8e-2c43-22f9981972eb/full/843,/0/default.jpg"
        );
        assert_eq!(artwork.artwork_url, "https://www.artic.edu/artworks/27992");
        assert_eq!(artwork.description.as_deref(), Some("Painting of people in a park"));
    }

    #[test]
    fn test_aic_defaults() {
        let record = AicArtwork {
            id: json!(5),
            title: json!("Untitled"),
            ..Default::default()
        };
        let artwork = aic_to_unified(&record, ASSETS).unwrap();

        assert_eq!(artwork.artist, UNKNOWN_ARTIST);
        assert_eq!(artwork.date, "");
        assert_eq!(artwork.image_url, "");
    }

    #[test]
    fn test_aic_drops_invalid_records() {
        let missing_title = AicArtwork {
            title: serde_json::Value::Null,
            ..aic_record()
        };
        let string_id = AicArtwork {
            id: json!("27992"),
            ..aic_record()
        };
        let numeric_title = AicArtwork {
            title: json!(42),
            ..aic_record()
        };

        assert!(aic_to_unified(&missing_title, ASSETS).is_none());
        assert!(aic_to_unified(&string_id, ASSETS).is_none());
        assert!(aic_to_unified(&numeric_title, ASSETS).is_none());
    }

    #[test]
    fn test_image_width() {
        assert_eq!(
            aic_image_url("https://www.artic.edu/iiif/2/", "abc", 400),
            "https://www.artic.edu/iiif/2/abc/full/400,/0/default.jpg"
        );
    }
}
