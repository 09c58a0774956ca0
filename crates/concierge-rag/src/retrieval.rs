//! Keyword retrieval over guide snippets
//!
//! Flattens the guide into tagged snippets, scores each one by how many
//! question tokens it contains, weights the score by section and keeps the
//! best matches for the context block.
//!
//! Author: hephaex@gmail.com

use concierge_core::{GuideDocument, RetrievalConfig, ScoredSnippet, Sections, Snippet, Suite};

/// Context text used when no snippet matches the question
pub const NO_EXCERPTS_PLACEHOLDER: &str =
    "(No relevant excerpts were found in the guide for this question.)";

// ============================================================================
// Snippet Extraction
// ============================================================================

/// Flatten guide sections into tagged snippets.
///
/// Order is fixed: rules, info, useful, arrival, appliances. Arrival entries
/// are limited to `suite` when one is given; appliance entries always cover
/// both suites.
pub fn extract_snippets(sections: Option<&Sections>, suite: Option<Suite>) -> Vec<Snippet> {
    let Some(sections) = sections else {
        return Vec::new();
    };

    let mut snippets = Vec::new();
    let mut add = |entries: &[String], tag: &str| {
        snippets.extend(entries.iter().map(|text| Snippet::new(tag, text.as_str())));
    };

    add(&sections.rules.content, "rules");
    add(&sections.info.content, "info");
    add(&sections.useful.content, "useful");

    let arrival_suites: &[Suite] = match suite {
        Some(ref s) => std::slice::from_ref(s),
        None => &Suite::ALL,
    };
    for &s in arrival_suites {
        add(sections.arrival.for_suite(s), &format!("arrival-{s}"));
    }

    for s in Suite::ALL {
        add(sections.appliances.for_suite(s), &format!("appliances-{s}"));
    }

    snippets
}

// ============================================================================
// Scoring
// ============================================================================

/// Lowercased question tokens used for matching. Token length is measured
/// in UTF-16 code units, so a single emoji counts as two.
pub fn tokenize(question: &str, config: &RetrievalConfig) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .take(config.max_question_tokens)
        .filter(|token| token.encode_utf16().count() >= config.min_token_chars)
        .map(String::from)
        .collect()
}

/// Section weight applied to the raw match count
pub fn tag_weight(tag: &str) -> u32 {
    if tag.starts_with("info") || tag.starts_with("arrival") {
        3
    } else if tag.starts_with("rules") {
        2
    } else {
        1
    }
}

/// Weighted score: tokens found in the snippet text, times the tag weight.
/// A token repeated in the question counts once per occurrence.
pub fn score_snippet(snippet: &Snippet, tokens: &[String]) -> u32 {
    let text = snippet.text.to_lowercase();
    let matches = tokens
        .iter()
        .filter(|token| text.contains(token.as_str()))
        .count() as u32;
    matches * tag_weight(&snippet.tag)
}

/// Score, drop non-matching snippets, sort by descending score (stable) and
/// keep at most `limit`.
pub fn rank_snippets(snippets: Vec<Snippet>, tokens: &[String], limit: usize) -> Vec<ScoredSnippet> {
    let mut scored: Vec<ScoredSnippet> = snippets
        .into_iter()
        .map(|snippet| {
            let score = score_snippet(&snippet, tokens);
            ScoredSnippet { snippet, score }
        })
        .filter(|s| s.score > 0)
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}

/// Render ranked snippets as `[rank] (tag) text` lines
pub fn render_context(ranked: &[ScoredSnippet]) -> String {
    if ranked.is_empty() {
        return NO_EXCERPTS_PLACEHOLDER.to_string();
    }

    ranked
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[{}] ({}) {}", i + 1, s.tag(), s.text()))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Retriever
// ============================================================================

/// Result of retrieving excerpts for one question
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Snippets considered before scoring
    pub candidates: usize,

    /// Surviving snippets in rank order
    pub ranked: Vec<ScoredSnippet>,

    /// Context block sent to the model
    pub context: String,
}

impl Retrieval {
    pub fn matched(&self) -> usize {
        self.ranked.len()
    }
}

/// Keyword retriever over a guide document
#[derive(Debug, Clone, Default)]
pub struct Retriever {
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Select the guide language, flatten, score and render the context block
    pub fn retrieve(
        &self,
        guide: &GuideDocument,
        lang: &str,
        suite: Option<Suite>,
        question: &str,
    ) -> Retrieval {
        let sections = guide.sections_for(lang, &self.config.default_lang);
        if sections.is_none() {
            tracing::debug!(lang, "guide has no usable sections");
        }

        let snippets = extract_snippets(sections, suite);
        let candidates = snippets.len();
        let tokens = tokenize(question, &self.config);
        let ranked = rank_snippets(snippets, &tokens, self.config.max_snippets);

        tracing::debug!(
            candidates,
            tokens = tokens.len(),
            matched = ranked.len(),
            "snippets ranked"
        );

        let context = render_context(&ranked);
        Retrieval {
            candidates,
            ranked,
            context,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_guide() -> GuideDocument {
        GuideDocument::from(json!({
            "en": { "sections": {
                "rules": { "content": ["No smoking inside the suite."] },
                "info": { "content": ["Check-in is after 15:00.", "Check-out is before 11:00."] },
                "useful": { "content": ["The pharmacy is two blocks away."] },
                "arrival": {
                    "suite313": ["Suite 313 door code is 1234."],
                    "suite413": ["Suite 413 door code is 5678."]
                },
                "appliances": {
                    "suite313": ["The 313 coffee machine uses pods."],
                    "suite413": ["The 413 coffee machine uses ground beans."]
                }
            } }
        }))
    }

    fn tags(snippets: &[Snippet]) -> Vec<&str> {
        snippets.iter().map(|s| s.tag.as_str()).collect()
    }

    #[test]
    fn test_extraction_order_without_suite() {
        let guide = sample_guide();
        let snippets = extract_snippets(guide.sections_for("en", "he"), None);
        assert_eq!(
            tags(&snippets),
            vec![
                "rules",
                "info",
                "info",
                "useful",
                "arrival-313",
                "arrival-413",
                "appliances-313",
                "appliances-413"
            ]
        );
    }

    #[test]
    fn test_suite_filters_arrival_only() {
        let guide = sample_guide();
        let snippets = extract_snippets(guide.sections_for("en", "he"), Some(Suite::S313));
        let tags = tags(&snippets);
        assert!(tags.contains(&"arrival-313"));
        assert!(!tags.contains(&"arrival-413"));
        assert!(tags.contains(&"appliances-313"));
        assert!(tags.contains(&"appliances-413"));

        let snippets = extract_snippets(guide.sections_for("en", "he"), Some(Suite::S413));
        let tags: Vec<_> = snippets.iter().map(|s| s.tag.as_str()).collect();
        assert!(!tags.contains(&"arrival-313"));
        assert!(tags.contains(&"arrival-413"));
    }

    #[test]
    fn test_no_sections_yields_no_snippets() {
        assert!(extract_snippets(None, Some(Suite::S313)).is_empty());
    }

    #[test]
    fn test_tokenize_limits() {
        let config = RetrievalConfig::default();
        let question = (0..30).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        assert_eq!(tokenize(&question, &config).len(), 24);

        let tokens = tokenize("A Wifi  password ? x", &config);
        assert_eq!(tokens, vec!["wifi", "password"]);

        // Only the first 24 tokens are considered, even if some are dropped later
        let question = format!("{} wifi", vec!["a"; 24].join(" "));
        assert!(tokenize(&question, &config).is_empty());
    }

    #[test]
    fn test_token_length_in_utf16_units() {
        let config = RetrievalConfig::default();
        assert_eq!(tokenize("🏖 a é", &config), vec!["🏖"]);
        assert_eq!(tokenize("מה הקוד", &config), vec!["מה", "הקוד"]);

        let snippet = Snippet::new("useful", "Beach towels: 🏖 in the closet");
        let tokens = tokenize("🏖", &config);
        assert_eq!(score_snippet(&snippet, &tokens), 1);
    }

    #[test]
    fn test_tag_weights() {
        assert_eq!(tag_weight("info"), 3);
        assert_eq!(tag_weight("arrival-313"), 3);
        assert_eq!(tag_weight("rules"), 2);
        assert_eq!(tag_weight("useful"), 1);
        assert_eq!(tag_weight("appliances-413"), 1);
    }

    #[test]
    fn test_repeated_question_tokens_count_twice() {
        let snippet = Snippet::new("useful", "Parking is free");
        let tokens = vec!["parking".to_string(), "parking".to_string()];
        assert_eq!(score_snippet(&snippet, &tokens), 2);
    }

    #[test]
    fn test_score_is_case_insensitive_substring() {
        let snippet = Snippet::new("rules", "NO PETS allowed");
        let tokens = vec!["pet".to_string(), "dogs".to_string()];
        assert_eq!(score_snippet(&snippet, &tokens), 2);
    }

    #[test]
    fn test_more_matches_never_rank_lower() {
        let tokens = vec!["towel".to_string(), "extra".to_string(), "beach".to_string()];
        let fewer = Snippet::new("useful", "Towels are in the closet");
        let more = Snippet::new("useful", "Extra beach towels are in the closet");
        assert!(score_snippet(&more, &tokens) >= score_snippet(&fewer, &tokens));

        for tag in ["info", "rules", "arrival-313", "useful"] {
            let a = Snippet::new(tag, "towel");
            let b = Snippet::new(tag, "extra towel");
            assert!(score_snippet(&b, &tokens) >= score_snippet(&a, &tokens));
        }
    }

    #[test]
    fn test_info_outranks_other_at_equal_matches() {
        let tokens = vec!["parking".to_string()];
        let snippets = vec![
            Snippet::new("other", "Parking behind the building"),
            Snippet::new("info", "Parking behind the building"),
        ];
        let ranked = rank_snippets(snippets, &tokens, 18);
        assert_eq!(ranked[0].tag(), "info");
        assert_eq!(ranked[0].score, 3);
        assert_eq!(ranked[1].score, 1);
    }

    #[test]
    fn test_rank_is_stable_and_drops_zero_scores() {
        let tokens = vec!["pool".to_string()];
        let snippets = vec![
            Snippet::new("useful", "first pool"),
            Snippet::new("useful", "no match"),
            Snippet::new("useful", "second pool"),
        ];
        let ranked = rank_snippets(snippets, &tokens, 18);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].text(), "first pool");
        assert_eq!(ranked[1].text(), "second pool");
    }

    #[test]
    fn test_rank_caps_at_limit() {
        let tokens = vec!["sea".to_string()];
        let snippets = (0..30)
            .map(|i| Snippet::new("useful", format!("sea view {i}")))
            .collect();
        let ranked = rank_snippets(snippets, &tokens, 18);
        assert_eq!(ranked.len(), 18);
        assert_eq!(ranked[17].text(), "sea view 17");
    }

    #[test]
    fn test_render_context() {
        assert_eq!(render_context(&[]), NO_EXCERPTS_PLACEHOLDER);

        let ranked = vec![
            ScoredSnippet {
                snippet: Snippet::new("info", "Check-in is after 15:00."),
                score: 3,
            },
            ScoredSnippet {
                snippet: Snippet::new("rules", "Quiet hours from 22:00."),
                score: 2,
            },
        ];
        assert_eq!(
            render_context(&ranked),
            "[1] (info) Check-in is after 15:00.\n[2] (rules) Quiet hours from 22:00."
        );
    }

    #[test]
    fn test_check_in_example() {
        let guide = GuideDocument::from(json!({
            "en": { "sections": { "info": { "content": ["Check-in is after 15:00."] } } }
        }));
        let retrieval = Retriever::default().retrieve(
            &guide,
            "en",
            Some(Suite::S313),
            "What time is check-in?",
        );

        assert_eq!(retrieval.candidates, 1);
        assert_eq!(retrieval.matched(), 1);
        assert_eq!(retrieval.ranked[0].tag(), "info");
        assert_eq!(retrieval.ranked[0].score, 3);
        assert_eq!(retrieval.context, "[1] (info) Check-in is after 15:00.");
    }

    #[test]
    fn test_unmatched_question_uses_placeholder() {
        let retrieval = Retriever::default().retrieve(&sample_guide(), "en", None, "zzz qqq");
        assert_eq!(retrieval.matched(), 0);
        assert_eq!(retrieval.context, NO_EXCERPTS_PLACEHOLDER);
    }

    #[test]
    fn test_unknown_language_falls_back_to_hebrew() {
        let guide = GuideDocument::from(json!({
            "he": { "sections": { "useful": { "content": ["wifi: BlueGuest"] } } }
        }));
        let retrieval = Retriever::default().retrieve(&guide, "fr", None, "wifi password");
        assert_eq!(retrieval.candidates, 1);
        assert_eq!(retrieval.context, "[1] (useful) wifi: BlueGuest");
    }
}
