/// Venue adapter names (used in CLI and logs)
pub const CAVEAT_API: &str = "caveat";

// Caveat NYC listing page and catalog identity
pub const CAVEAT_URL: &str = "https://caveat.nyc/";
pub const CAVEAT_VENUE_NAME: &str = "Caveat";
pub const CAVEAT_VENUE_SLUG: &str = "caveat-nyc";
pub const CAVEAT_BANNER_PHRASE: &str = "COMEDY. IMPROV.";

/// Structural selectors for likely event containers ("item/event/show/card" vocabulary)
pub const DEFAULT_CANDIDATE_SELECTORS: &[&str] = &[
    r#"[class*="item"]"#,
    r#"[class*="event"]"#,
    r#"[class*="show"]"#,
    r#"[class*="card"]"#,
];

/// Candidate containers with less trimmed text than this are layout noise
pub const MIN_CANDIDATE_CHARS: usize = 20;

/// Promotional trailers cut from titles and skipped as descriptions
pub const BOILERPLATE_PHRASES: &[&str] = &[
    "get tickets",
    "in-person",
    "livestream",
    "see more",
    "tickets",
];

/// URL fragments identifying a ticketing platform link
pub const TICKETING_MARKERS: &[&str] = &[
    "eventbrite",
    "ticketmaster",
    "ticketweb",
    "dice.fm",
    "seetickets",
    "ticket",
];

pub const SOLD_OUT_MARKER: &str = "sold out";

// Performance record defaults
pub const DEFAULT_DURATION_MINUTES: u32 = 90;
pub const DEFAULT_INTERMISSIONS: u32 = 0;
pub const DEFAULT_LANGUAGE: &str = "English";
pub const DEFAULT_SHOWING_TIME: &str = "7:00 PM";
pub const DEFAULT_COMPANY_NAME: &str = "Various Artists";

/// Days added to "now" when a listing date cannot be parsed
pub const DATE_FALLBACK_DAYS: i64 = 7;

/// How far in the past a parsed month/day may fall before it is read as next year's date
pub const YEAR_ROLLOVER_GRACE_DAYS: i64 = 31;
