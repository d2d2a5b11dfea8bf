use std::collections::BTreeSet;

use crate::common::types::CategoryTag;

/// Keyword rules, evaluated in order; every rule that matches contributes its tag
const RULES: &[(&[&str], CategoryTag)] = &[
    (&["comedy", "joke", "funny"], CategoryTag::Comedy),
    (&["story", "tale", "narrative"], CategoryTag::SpokenWord),
    (&["show", "performance", "variety"], CategoryTag::Experimental),
];

/// Tags an event from its title and description. Never returns an empty set:
/// events matching no rule are tagged `other`.
pub fn classify(title: &str, description: Option<&str>) -> BTreeSet<CategoryTag> {
    let combined = format!("{} {}", title, description.unwrap_or_default()).to_lowercase();

    let mut tags: BTreeSet<CategoryTag> = RULES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| combined.contains(k)))
        .map(|(_, tag)| *tag)
        .collect();

    if tags.is_empty() {
        tags.insert(CategoryTag::Other);
    }
    tags
}
