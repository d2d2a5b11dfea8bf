use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Structural extraction unit: one DOM container's text and the links inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub text: String,
    pub ticket_links: Vec<String>,
}

/// A candidate parsed into event fields, before date resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftEvent {
    pub title: String,
    pub description: Option<String>,
    /// `"JUN 10"` style month/day text, empty for recurring listings
    pub raw_date_fragment: String,
    pub raw_time_fragment: Option<String>,
    pub ticket_url: Option<String>,
    pub is_recurring: bool,
    pub sold_out: bool,
}

/// Where a normalized event's date came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateSource {
    Parsed,
    Fallback { reason: String },
}

impl DateSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, DateSource::Fallback { .. })
    }
}

/// Category tags assigned by the keyword classifier; ordering follows the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryTag {
    Comedy,
    SpokenWord,
    Experimental,
    Other,
}

impl CategoryTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryTag::Comedy => "comedy",
            CategoryTag::SpokenWord => "spoken-word",
            CategoryTag::Experimental => "experimental",
            CategoryTag::Other => "other",
        }
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last in-memory form of an event before it is written to the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub draft: DraftEvent,
    pub event_date: DateTime<Utc>,
    pub date_source: DateSource,
    pub category_tags: BTreeSet<CategoryTag>,
}

impl NormalizedEvent {
    pub fn title(&self) -> &str {
        &self.draft.title
    }
}

/// Run report handed back to the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationResult {
    pub venues_created: u32,
    pub performances_created: u32,
    pub performances_updated: u32,
    pub errors: Vec<String>,
}

impl IntegrationResult {
    /// All-zero report carrying a single top-level failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Fixed description of the venue a source adapter scrapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueDescriptor {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub coordinates: Coordinates,
    pub capacity: Option<u32>,
    pub venue_type: String,
    pub website: String,
}

/// Venue record as held by the catalog store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    #[serde(flatten)]
    pub descriptor: VenueDescriptor,
    pub submitted_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub description: Option<String>,
}

/// One scheduled occurrence of a performance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Showing {
    pub date: DateTime<Utc>,
    pub time: String,
    pub venue_id: Uuid,
    pub ticket_url: Option<String>,
    pub sold_out: bool,
}

/// Fields for a performance that does not exist in the catalog yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerformance {
    pub title: String,
    pub description: String,
    pub performance_types: Vec<String>,
    pub duration_minutes: u32,
    pub intermissions: u32,
    pub languages: Vec<String>,
    pub venue_ids: Vec<Uuid>,
    pub company: Company,
    pub showings: Vec<Showing>,
    pub submitted_by: String,
}

/// Performance record as held by the catalog store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: NewPerformance,
    pub created_at: DateTime<Utc>,
}

impl Performance {
    /// Whether this performance already covers `title` showing at `date` in `venue_id`
    pub fn matches(&self, title: &str, date: DateTime<Utc>, venue_id: Uuid) -> bool {
        self.fields.title == title
            && self.fields.venue_ids.contains(&venue_id)
            && self.fields.showings.iter().any(|s| s.date == date)
    }
}
