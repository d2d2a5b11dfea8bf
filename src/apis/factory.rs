use super::caveat::CaveatAdapter;
use super::VenueAdapter;
use crate::common::constants::CAVEAT_API;

/// Build the adapter registered under `api_name`
pub fn create_adapter(api_name: &str) -> Option<Box<dyn VenueAdapter>> {
    match api_name {
        CAVEAT_API => Some(Box::new(CaveatAdapter::new())),
        _ => None,
    }
}

/// Get all supported adapter names
pub fn supported_venues() -> Vec<&'static str> {
    vec![CAVEAT_API]
}
