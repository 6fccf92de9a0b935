//! The fixed classification rubric: twelve content categories split into
//! two severity tiers, plus the prompt text sent to the classification
//! model.
//!
//! Tier names are part of the wire format (`tierA`/`tierB` keys in the
//! classifier response) and must not change without versioning the
//! protocol.

/// Tier-A (lower-severity) category identifiers.
pub const TIER_A_CATEGORIES: &[&str] = &[
    "suggestive",
    "partial_nudity",
    "violence",
    "weapons",
    "substance_use",
    "profanity_text",
    "hate_symbols",
];

/// Tier-B (higher-severity) category identifiers.
pub const TIER_B_CATEGORIES: &[&str] = &[
    "explicit_nudity",
    "sexual_activity",
    "graphic_violence",
    "minors_at_risk",
    "self_harm",
];

/// Minimum confidence (inclusive) at which a category finding flags a frame.
pub const FLAG_CONFIDENCE_MIN: u8 = 3;

/// Confidence values are a 1..=5 scale.
pub const CONFIDENCE_MIN: u8 = 1;
pub const CONFIDENCE_MAX: u8 = 5;

/// Returns `true` if `name` is a known category in either tier.
pub fn is_known_category(name: &str) -> bool {
    TIER_A_CATEGORIES.contains(&name) || TIER_B_CATEGORIES.contains(&name)
}

/// Build the rubric prompt sent with every frame.
///
/// The model is instructed to return one JSON object with `tierA` and
/// `tierB` keys, each mapping category name to
/// `{detected, confidence, reason}`.
pub fn rubric_prompt() -> String {
    let mut prompt = String::from(
        "You are a content-screening reviewer. Examine the supplied video \
         frame and rate it against every category below. For each category \
         report whether the content is present (detected), your confidence \
         on a 1-5 scale (5 = certain), and a one-sentence reason.\n\n\
         Tier A categories (review severity):\n",
    );
    for cat in TIER_A_CATEGORIES {
        prompt.push_str("  - ");
        prompt.push_str(cat);
        prompt.push('\n');
    }
    prompt.push_str("\nTier B categories (critical severity):\n");
    for cat in TIER_B_CATEGORIES {
        prompt.push_str("  - ");
        prompt.push_str(cat);
        prompt.push('\n');
    }
    prompt.push_str(
        "\nRespond with a single JSON object of the form \
         {\"tierA\": {<category>: {\"detected\": bool, \"confidence\": 1-5, \
         \"reason\": string}, ...}, \"tierB\": {...}} covering every \
         category exactly once. Do not include any other text.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_categories_total() {
        assert_eq!(TIER_A_CATEGORIES.len() + TIER_B_CATEGORIES.len(), 12);
    }

    #[test]
    fn tiers_do_not_overlap() {
        for cat in TIER_B_CATEGORIES {
            assert!(!TIER_A_CATEGORIES.contains(cat), "{cat} appears in both tiers");
        }
    }

    #[test]
    fn known_category_lookup() {
        assert!(is_known_category("violence"));
        assert!(is_known_category("self_harm"));
        assert!(!is_known_category("jaywalking"));
    }

    #[test]
    fn prompt_mentions_every_category() {
        let prompt = rubric_prompt();
        for cat in TIER_A_CATEGORIES.iter().chain(TIER_B_CATEGORIES) {
            assert!(prompt.contains(cat), "prompt missing {cat}");
        }
    }
}
