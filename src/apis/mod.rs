//! Venue source adapters.
//!
//! Everything venue-specific (listing URL, catalog identity, layout hints,
//! timezone) lives behind [`VenueAdapter`]; the pipeline core never names a
//! venue. Adding a venue means adding a file here and a factory entry.

pub mod caveat;
pub mod factory;

use chrono_tz::Tz;

use crate::common::constants::DEFAULT_CANDIDATE_SELECTORS;
use crate::common::types::VenueDescriptor;

pub trait VenueAdapter: Send + Sync {
    /// Unique identifier for this adapter
    fn api_name(&self) -> &'static str;

    /// Listing page to render
    fn source_url(&self) -> &str;

    /// Fixed catalog record for the venue
    fn venue_descriptor(&self) -> VenueDescriptor;

    /// Timezone the listing's wall-clock times are in
    fn timezone(&self) -> Tz;

    /// Structural selectors for event containers on this venue's page
    fn candidate_selectors(&self) -> Vec<String> {
        DEFAULT_CANDIDATE_SELECTORS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Site-wide banner/tagline texts that must never become event titles
    fn banner_phrases(&self) -> Vec<String> {
        Vec::new()
    }
}
