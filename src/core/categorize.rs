//! Keyword categorizer for expenses recorded with only a description.

/// Category assigned when no keyword matches.
pub const FALLBACK_CATEGORY: &str = "Miscellaneous";

const RULES: &[(&[&str], &str)] = &[
    (&["food", "groceries", "restaurant"], "Food"),
    (&["transport", "gas", "taxi"], "Transportation"),
    (&["rent", "utility", "bill"], "Housing"),
    (&["entertainment", "movie", "game"], "Entertainment"),
];

/// Picks a category for a free-text description.
///
/// Matching is a case-insensitive substring search; the first rule with a
/// matching keyword wins.
#[must_use]
pub fn categorize_description(description: &str) -> &'static str {
    let desc = description.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| desc.contains(k)))
        .map_or(FALLBACK_CATEGORY, |(_, category)| *category)
}
