//! Keyword-overlap transaction categorization.
//!
//! A description is split on whitespace and lowercased. For every category,
//! each `(token, keyword)` pair where one contains the other counts as a match;
//! the category score is `matches / token_count`.
//!
//! - predicted category: highest score, ties to the earlier category; `other`
//!   when nothing matches
//! - confidence: `max / sum` of scores (floor `0.1` when the sum is zero),
//!   capped at `0.95`
//!
//! Known weakness: containment runs both ways, so short filler words match
//! longer keywords ("at" hits `water`, `atm` and `theater`; "the" hits
//! `theater`). Descriptions heavy in such words can land in an unrelated
//! category; low confidence usually flags them for manual review.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{CategoryPrediction, SpendingCategory, Transaction};

/// Confidence below which a categorization must be confirmed by a person.
pub const MANUAL_REVIEW_THRESHOLD: f64 = 0.7;

/// Confidence reported when no category matched at all.
pub const NO_MATCH_CONFIDENCE: f64 = 0.1;

/// Upper bound on reported confidence.
pub const MAX_CONFIDENCE: f64 = 0.95;

const HOUSING: &[&str] = &["rent", "mortgage", "apartment", "landlord", "lease", "property", "hoa", "housing"];
const FOOD: &[&str] = &[
    "grocery", "groceries", "restaurant", "cafe", "coffee", "pizza", "burger", "food", "dining",
    "supermarket", "bakery", "lunch", "dinner",
];
const TRANSPORTATION: &[&str] = &[
    "gas", "fuel", "uber", "lyft", "taxi", "parking", "transit", "bus", "train", "airline", "toll",
];
const UTILITIES: &[&str] = &["electric", "electricity", "water", "internet", "phone", "utility", "cable", "power", "sewer"];
const HEALTHCARE: &[&str] = &[
    "pharmacy", "doctor", "hospital", "dental", "medical", "clinic", "health", "prescription",
];
const ENTERTAINMENT: &[&str] = &["netflix", "spotify", "movie", "cinema", "concert", "game", "theater", "music", "hulu"];
const SHOPPING: &[&str] = &["amazon", "walmart", "target", "store", "mall", "clothing", "shop", "retail"];
const OTHER: &[&str] = &["fee", "atm", "transfer", "misc"];

/// True when `confidence` is below [`MANUAL_REVIEW_THRESHOLD`].
pub fn needs_manual_review(confidence: f64) -> bool {
    confidence < MANUAL_REVIEW_THRESHOLD
}

/// Fixed keyword table scorer.
#[derive(Debug, Clone)]
pub struct CategorizationScorer {
    rules: Vec<(SpendingCategory, &'static [&'static str])>,
}

impl Default for CategorizationScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl CategorizationScorer {
    pub fn new() -> Self {
        let rules = SpendingCategory::ALL
            .into_iter()
            .map(|category| (category, keywords(category)))
            .collect();
        Self { rules }
    }

    /// Score every category for `description` and pick the best.
    pub fn predict_category(&self, description: &str) -> CategoryPrediction {
        let tokens: Vec<String> = description
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let mut scores = BTreeMap::new();
        let mut best: Option<(SpendingCategory, f64)> = None;
        let mut sum = 0.0;

        for (category, keywords) in &self.rules {
            let score = if tokens.is_empty() {
                0.0
            } else {
                count_matches(&tokens, keywords) as f64 / tokens.len() as f64
            };
            scores.insert(*category, score);
            sum += score;

            match best {
                Some((_, top)) if score <= top => {}
                _ if score > 0.0 => best = Some((*category, score)),
                _ => {}
            }
        }

        let (category, confidence) = match best {
            Some((category, top)) if sum > 0.0 => (category, top / sum),
            _ => (SpendingCategory::Other, NO_MATCH_CONFIDENCE),
        };
        let confidence = confidence.min(MAX_CONFIDENCE);

        debug!(description, %category, confidence, "categorized");
        CategoryPrediction {
            category,
            confidence,
            scores,
        }
    }

    /// Categorize each transaction by its description.
    pub fn categorize_transactions(&self, transactions: &[Transaction]) -> Vec<CategoryPrediction> {
        transactions
            .iter()
            .map(|tx| self.predict_category(&tx.description))
            .collect()
    }
}

fn keywords(category: SpendingCategory) -> &'static [&'static str] {
    match category {
        SpendingCategory::Housing => HOUSING,
        SpendingCategory::Food => FOOD,
        SpendingCategory::Transportation => TRANSPORTATION,
        SpendingCategory::Utilities => UTILITIES,
        SpendingCategory::Healthcare => HEALTHCARE,
        SpendingCategory::Entertainment => ENTERTAINMENT,
        SpendingCategory::Shopping => SHOPPING,
        SpendingCategory::Other => OTHER,
    }
}

fn count_matches(tokens: &[String], keywords: &[&str]) -> usize {
    tokens
        .iter()
        .map(|token| {
            keywords
                .iter()
                .filter(|kw| token.contains(**kw) || kw.contains(token.as_str()))
                .count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_description_falls_back_to_other() {
        let p = CategorizationScorer::new().predict_category("");
        assert_eq!(p.category, SpendingCategory::Other);
        assert!(p.confidence <= NO_MATCH_CONFIDENCE);
        assert_eq!(p.scores.len(), 8);
    }

    #[test]
    fn unknown_word_falls_back_to_other() {
        let p = CategorizationScorer::new().predict_category("xyzzy_no_match");
        assert_eq!(p.category, SpendingCategory::Other);
        assert!((p.confidence - NO_MATCH_CONFIDENCE).abs() < 1e-12);
        assert!(p.scores.values().all(|s| *s == 0.0));
    }

    #[test]
    fn single_category_match_is_capped() {
        let p = CategorizationScorer::new().predict_category("Netflix monthly subscription");
        assert_eq!(p.category, SpendingCategory::Entertainment);
        assert!((p.confidence - MAX_CONFIDENCE).abs() < 1e-12);
        assert!(!needs_manual_review(p.confidence));
    }

    #[test]
    fn score_is_matches_over_tokens() {
        let p = CategorizationScorer::new().predict_category("Monthly RENT payment");
        assert_eq!(p.category, SpendingCategory::Housing);
        assert!((p.scores[&SpendingCategory::Housing] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn ties_go_to_earlier_category() {
        let p = CategorizationScorer::new().predict_category("gas water");
        assert_eq!(p.category, SpendingCategory::Transportation);
        assert!((p.confidence - 0.5).abs() < 1e-12);
        assert!(needs_manual_review(p.confidence));
    }

    #[test]
    fn short_filler_words_match_longer_keywords() {
        // "at" and "the" both sit inside "theater", outscoring the real "store" match.
        let p = CategorizationScorer::new().predict_category("Paid at the store");
        assert_eq!(p.category, SpendingCategory::Entertainment);
        assert!((p.scores[&SpendingCategory::Entertainment] - 0.5).abs() < 1e-12);
        assert!((p.scores[&SpendingCategory::Shopping] - 0.25).abs() < 1e-12);
        assert!((p.confidence - 0.4).abs() < 1e-12);
        assert!(needs_manual_review(p.confidence));
    }

    #[test]
    fn review_threshold_is_exclusive() {
        assert!(needs_manual_review(0.69));
        assert!(!needs_manual_review(0.7));
    }
}
