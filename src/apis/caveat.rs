use chrono_tz::Tz;

use super::VenueAdapter;
use crate::common::constants::{
    CAVEAT_API, CAVEAT_BANNER_PHRASE, CAVEAT_URL, CAVEAT_VENUE_NAME, CAVEAT_VENUE_SLUG,
};
use crate::common::types::{Coordinates, VenueDescriptor};

/// Caveat, a Lower East Side venue whose listings load client-side
pub struct CaveatAdapter {
    source_url: String,
}

impl Default for CaveatAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl CaveatAdapter {
    pub fn new() -> Self {
        Self {
            source_url: CAVEAT_URL.to_string(),
        }
    }

    /// Same adapter pointed at a mirror or saved copy of the listing page
    pub fn with_source_url(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
        }
    }
}

impl VenueAdapter for CaveatAdapter {
    fn api_name(&self) -> &'static str {
        CAVEAT_API
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn venue_descriptor(&self) -> VenueDescriptor {
        VenueDescriptor {
            name: CAVEAT_VENUE_NAME.to_string(),
            slug: CAVEAT_VENUE_SLUG.to_string(),
            description: "A library bar for curious people in the Lower East Side".to_string(),
            address: "21A Clinton St, New York, NY 10002".to_string(),
            city: "NYC".to_string(),
            state: "NY".to_string(),
            zip_code: "10002".to_string(),
            coordinates: Coordinates {
                lat: 40.7209,
                lng: -73.9837,
            },
            capacity: Some(75),
            venue_type: "multi-purpose".to_string(),
            website: "https://caveat.nyc".to_string(),
        }
    }

    fn timezone(&self) -> Tz {
        chrono_tz::America::New_York
    }

    fn banner_phrases(&self) -> Vec<String> {
        vec![CAVEAT_BANNER_PHRASE.to_string()]
    }
}
