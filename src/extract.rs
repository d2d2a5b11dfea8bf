use std::collections::HashSet;
use tracing::{debug, instrument, warn};

use crate::common::constants::{DEFAULT_CANDIDATE_SELECTORS, MIN_CANDIDATE_CHARS};
use crate::common::types::RawCandidate;
use crate::render::DomSnapshot;

/// Pulls likely event containers out of a rendered page.
///
/// Purely structural: nodes are chosen by selector and text length, nothing
/// here knows about dates or categories.
#[derive(Debug, Clone)]
pub struct CandidateExtractor {
    selectors: Vec<String>,
    min_text_chars: usize,
}

impl Default for CandidateExtractor {
    fn default() -> Self {
        Self::new(
            DEFAULT_CANDIDATE_SELECTORS.iter().map(|s| s.to_string()).collect(),
            MIN_CANDIDATE_CHARS,
        )
    }
}

impl CandidateExtractor {
    pub fn new(selectors: Vec<String>, min_text_chars: usize) -> Self {
        Self {
            selectors,
            min_text_chars,
        }
    }

    /// Only the innermost qualifying containers are kept: a wrapper around
    /// several event cards is dropped in favor of the cards themselves.
    ///
    /// An empty result means the page layout no longer matches the selectors;
    /// it is logged, never an error.
    #[instrument(skip(self, snapshot), fields(url = %snapshot.url()))]
    pub fn extract(&self, snapshot: &DomSnapshot) -> Vec<RawCandidate> {
        let nodes = match snapshot.select(&self.selectors) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("Candidate selection failed: {}", e);
                return Vec::new();
            }
        };
        debug!("Found {} potential event containers", nodes.len());

        let qualifies: Vec<bool> = nodes
            .iter()
            .map(|node| node.text.trim().chars().count() >= self.min_text_chars)
            .collect();

        let mut is_wrapper = vec![false; nodes.len()];
        for (node, _) in nodes.iter().zip(&qualifies).filter(|(_, q)| **q) {
            for &outer in &node.enclosed_by {
                is_wrapper[outer] = true;
            }
        }

        let mut seen = HashSet::new();
        let candidates: Vec<RawCandidate> = nodes
            .into_iter()
            .enumerate()
            .filter(|(i, _)| qualifies[*i] && !is_wrapper[*i])
            .map(|(_, node)| node)
            .filter(|node| seen.insert(node.text.clone()))
            .map(|node| RawCandidate {
                text: node.text,
                ticket_links: node.links,
            })
            .collect();

        if candidates.is_empty() {
            warn!(
                "No event candidates matched {:?}; the listing layout may have changed",
                self.selectors
            );
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(body: &str) -> DomSnapshot {
        DomSnapshot::new(
            "https://caveat.nyc/",
            format!("<html><body>{}</body></html>", body),
        )
    }

    #[test]
    fn test_short_containers_are_noise() {
        let extractor = CandidateExtractor::default();
        let candidates = extractor.extract(&snapshot(
            r#"<div class="item">Short banner 15</div>
               <div class="item">JUN 10 8:00 PM Storytelling Hour GET TICKETS</div>"#,
        ));
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].text.starts_with("JUN 10"));
    }

    #[test]
    fn test_collects_links_in_order() {
        let extractor = CandidateExtractor::default();
        let candidates = extractor.extract(&snapshot(
            r#"<div class="show-card">JUN 10 8:00 PM Storytelling Hour
                 <a href="https://www.eventbrite.com/e/1">GET TICKETS</a>
                 <a href="/livestream">LIVESTREAM</a>
               </div>"#,
        ));
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].ticket_links,
            vec![
                "https://www.eventbrite.com/e/1".to_string(),
                "https://caveat.nyc/livestream".to_string()
            ]
        );
    }

    #[test]
    fn test_identical_texts_are_collapsed() {
        let extractor = CandidateExtractor::default();
        let candidates = extractor.extract(&snapshot(
            r#"<div class="item">JUN 10 8:00 PM Storytelling Hour</div>
               <div class="card">JUN 10 8:00 PM Storytelling Hour</div>"#,
        ));
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_wrapper_around_cards_is_not_a_candidate() {
        let extractor = CandidateExtractor::default();
        let candidates = extractor.extract(&snapshot(
            r#"<section class="events-list">
                 <div class="event-card">JUN 10 8:00 PM <h3>Storytelling Hour</h3></div>
                 <div class="event-card">JUN 12 7:30 PM <h3>Science Night</h3><p>SOLD OUT</p></div>
               </section>"#,
        ));
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].text, "JUN 10 8:00 PM\nStorytelling Hour");
        assert!(!candidates[0].text.contains("SOLD OUT"));
        assert!(candidates[1].text.contains("Science Night"));
    }

    #[test]
    fn test_short_inner_match_keeps_its_card() {
        let extractor = CandidateExtractor::default();
        let candidates = extractor.extract(&snapshot(
            r#"<div class="event-card">
                 <div class="event-date">JUN 10</div>
                 <h3>Storytelling Hour</h3>
               </div>"#,
        ));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "JUN 10\nStorytelling Hour");
    }

    #[test]
    fn test_inline_markup_in_title_survives_parsing() {
        let extractor = CandidateExtractor::default();
        let parser = crate::parse::EventParser::default();
        let candidates = extractor.extract(&snapshot(
            r#"<div class="event-card"><span>JUN 10</span> <span>8:00 PM</span>
                 <h3>An Evening with <em>Jane Doe</em></h3></div>
               <div class="event-card"><span>JUN 11</span> <span>8:00 PM</span>
                 <h3>The <b>Big</b> Show</h3></div>"#,
        ));
        let titles: Vec<String> = candidates
            .iter()
            .filter_map(|c| parser.parse(c))
            .map(|draft| draft.title)
            .collect();
        assert_eq!(titles, vec!["An Evening with Jane Doe", "The Big Show"]);
    }

    #[test]
    fn test_unmatched_layout_yields_empty() {
        let extractor = CandidateExtractor::default();
        let candidates = extractor.extract(&snapshot(
            r#"<section>JUN 10 8:00 PM Storytelling Hour GET TICKETS</section>"#,
        ));
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_bad_selector_yields_empty() {
        let extractor = CandidateExtractor::new(vec!["[[".to_string()], 20);
        assert!(extractor
            .extract(&snapshot(r#"<div class="item">long enough text for a candidate</div>"#))
            .is_empty());
    }
}
