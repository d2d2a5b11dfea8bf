use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use crate::common::constants::{BOILERPLATE_PHRASES, SOLD_OUT_MARKER, TICKETING_MARKERS};
use crate::common::types::{DraftEvent, RawCandidate};

/// Month abbreviation, day of month and clock time, e.g. `JUN 5  7:00 PM`
static DATE_TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})\s+(\d{1,2}:\d{2}\s*[ap]m)",
    )
    .expect("static date pattern")
});

/// A boilerplate phrase and everything after it
static BOILERPLATE_TAIL: Lazy<Regex> = Lazy::new(|| {
    let alternatives = BOILERPLATE_PHRASES
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?is)({}).*$", alternatives)).expect("static boilerplate pattern")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

/// Turns raw candidate text into a draft event, or drops it.
#[derive(Debug, Clone, Default)]
pub struct EventParser {
    banner_phrases: Vec<String>,
}

impl EventParser {
    pub fn new(banner_phrases: Vec<String>) -> Self {
        Self {
            banner_phrases: banner_phrases.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// Returns `None` for candidates that do not carry a usable title.
    #[instrument(skip_all)]
    pub fn parse(&self, candidate: &RawCandidate) -> Option<DraftEvent> {
        let text = candidate.text.as_str();

        let (title_region, raw_date_fragment, raw_time_fragment) =
            match DATE_TIME_PATTERN.captures(text) {
                Some(caps) => {
                    let whole = caps.get(0)?;
                    let month: String = caps[1].chars().take(3).collect::<String>().to_uppercase();
                    let day = caps[2].trim_start_matches('0');
                    let time = WHITESPACE.replace_all(&caps[3], " ").to_uppercase();
                    (
                        text[whole.end()..].trim_start(),
                        format!("{} {}", month, day),
                        Some(time),
                    )
                }
                None => (text.trim_start(), String::new(), None),
            };
        let is_recurring = raw_time_fragment.is_none();

        let mut region_lines = title_region.lines();
        let title = clean_title(region_lines.next().unwrap_or_default());

        if !self.is_usable_title(&title) {
            debug!("Discarding candidate with title {:?}", title);
            return None;
        }

        let description = region_lines
            .map(str::trim)
            .find(|line| !line.is_empty() && !is_boilerplate(line))
            .map(str::to_string);

        Some(DraftEvent {
            title,
            description,
            raw_date_fragment,
            raw_time_fragment,
            ticket_url: find_ticket_link(&candidate.ticket_links),
            is_recurring,
            sold_out: text.to_lowercase().contains(SOLD_OUT_MARKER),
        })
    }

    fn is_usable_title(&self, title: &str) -> bool {
        if title.chars().count() <= 3 {
            return false;
        }
        let lowered = title.to_lowercase();
        !self
            .banner_phrases
            .iter()
            .any(|banner| lowered.contains(banner.as_str()))
    }
}

/// Cuts promotional trailers ("GET TICKETS", "Livestream", ...) off a title line.
pub fn clean_title(line: &str) -> String {
    BOILERPLATE_TAIL.replace(line, "").trim().to_string()
}

fn is_boilerplate(line: &str) -> bool {
    let lowered = line.to_lowercase();
    lowered.contains(SOLD_OUT_MARKER) || BOILERPLATE_PHRASES.iter().any(|p| lowered.contains(p))
}

fn find_ticket_link(links: &[String]) -> Option<String> {
    links
        .iter()
        .find(|link| {
            let lowered = link.to_lowercase();
            TICKETING_MARKERS.iter().any(|m| lowered.contains(m))
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, links: &[&str]) -> RawCandidate {
        RawCandidate {
            text: text.to_string(),
            ticket_links: links.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn parser() -> EventParser {
        EventParser::new(vec!["COMEDY. IMPROV.".to_string()])
    }

    #[test]
    fn test_dated_title_has_boilerplate_stripped() {
        let draft = parser()
            .parse(&candidate("JUN 05  7:00 PM New Show GET TICKETS NOW", &[]))
            .unwrap();
        assert_eq!(draft.title, "New Show");
        assert!(!draft.is_recurring);
        assert_eq!(draft.raw_date_fragment, "JUN 5");
        assert_eq!(draft.raw_time_fragment.as_deref(), Some("7:00 PM"));
    }

    #[test]
    fn test_boilerplate_is_case_insensitive() {
        assert_eq!(clean_title("Science Night in-person and online"), "Science Night");
        assert_eq!(clean_title("Science Night Livestream"), "Science Night");
        assert_eq!(clean_title("Science Night see more"), "Science Night");
    }

    #[test]
    fn test_undated_candidate_is_recurring_with_first_line_title() {
        let draft = parser()
            .parse(&candidate(
                "Weekly Trivia Night\nGET TICKETS\nTest your knowledge every Tuesday",
                &[],
            ))
            .unwrap();
        assert_eq!(draft.title, "Weekly Trivia Night");
        assert!(draft.is_recurring);
        assert!(draft.raw_date_fragment.is_empty());
        assert_eq!(draft.raw_time_fragment, None);
        assert_eq!(
            draft.description.as_deref(),
            Some("Test your knowledge every Tuesday")
        );
    }

    #[test]
    fn test_date_split_across_lines_still_matches() {
        let draft = parser()
            .parse(&candidate(
                "JUN 10\n8:00 PM\nStorytelling Hour\nTrue tales from strangers\nIn-person",
                &[],
            ))
            .unwrap();
        assert_eq!(draft.title, "Storytelling Hour");
        assert_eq!(draft.description.as_deref(), Some("True tales from strangers"));
        assert_eq!(draft.raw_time_fragment.as_deref(), Some("8:00 PM"));
    }

    #[test]
    fn test_short_or_banner_titles_are_discarded() {
        assert!(parser().parse(&candidate("ok", &[])).is_none());
        assert!(parser()
            .parse(&candidate("COMEDY. IMPROV.\nand lots more at the bar", &[]))
            .is_none());
        assert!(parser()
            .parse(&candidate("JUN 10 8:00 PM GET TICKETS", &[]))
            .is_none());
    }

    #[test]
    fn test_ticket_link_prefers_ticketing_urls() {
        let draft = parser()
            .parse(&candidate(
                "JUN 10 8:00 PM Storytelling Hour GET TICKETS",
                &[
                    "https://caveat.nyc/livestream",
                    "https://www.eventbrite.com/e/storytelling-hour",
                    "https://caveat.nyc/tickets/2",
                ],
            ))
            .unwrap();
        assert_eq!(
            draft.ticket_url.as_deref(),
            Some("https://www.eventbrite.com/e/storytelling-hour")
        );

        let none = parser()
            .parse(&candidate(
                "JUN 10 8:00 PM Storytelling Hour",
                &["https://caveat.nyc/about"],
            ))
            .unwrap();
        assert_eq!(none.ticket_url, None);
    }

    #[test]
    fn test_sold_out_marker_sets_flag() {
        let draft = parser()
            .parse(&candidate("JUN 12 9:30 PM Late Show\nSOLD OUT", &[]))
            .unwrap();
        assert!(draft.sold_out);
        assert_eq!(draft.description, None);
    }
}
