//! Risk classification of a query and its result set.

use crate::record::RecallRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four risk states shown by the status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClassificationState {
    /// No query entered
    #[default]
    Idle,
    /// At least one exact (zero-typo) match
    Red,
    /// Matches exist, none of them exact
    Orange,
    /// A non-empty query with no matches
    Green,
}

impl ClassificationState {
    /// Every state, in badge order.
    pub const ALL: [Self; 4] = [Self::Idle, Self::Red, Self::Orange, Self::Green];

    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Red => "RED",
            Self::Orange => "ORANGE",
            Self::Green => "GREEN",
        }
    }

    /// Badge text; empty for IDLE, which shows no badge.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Red => "Product Recalled",
            Self::Orange => "Possible recall match — verify brand/model details",
            Self::Green => "No recall found",
        }
    }

    /// CSS modifier used by the page.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Green => "green",
        }
    }

    /// Whether the badge warns about a recall.
    pub fn is_warning(self) -> bool {
        matches!(self, Self::Red | Self::Orange)
    }
}

impl fmt::Display for ClassificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a query and the hits the index returned for it.
///
/// A query made only of whitespace counts as empty. Hits without usable
/// ranking info never count as exact matches.
pub fn classify(query: &str, hits: &[RecallRecord]) -> ClassificationState {
    if query.trim().is_empty() {
        ClassificationState::Idle
    } else if hits.is_empty() {
        ClassificationState::Green
    } else if hits.iter().any(RecallRecord::is_exact_match) {
        ClassificationState::Red
    } else {
        ClassificationState::Orange
    }
}

/// Smallest typo count among hits that carry one.
pub fn min_typos(hits: &[RecallRecord]) -> Option<u32> {
    hits.iter().filter_map(RecallRecord::typo_count).min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hit(id: &str, typos: Option<u32>) -> RecallRecord {
        let record = RecallRecord::new(id, "Teddy Bear");
        match typos {
            Some(n) => record.with_typos(n),
            None => record,
        }
    }

    #[test]
    fn test_empty_query_is_idle() {
        assert_eq!(classify("", &[]), ClassificationState::Idle);
        assert_eq!(classify("", &[hit("1", Some(0))]), ClassificationState::Idle);
        assert_eq!(classify("   ", &[hit("1", Some(0))]), ClassificationState::Idle);
    }

    #[test]
    fn test_no_hits_is_green() {
        assert_eq!(classify("zzz-nonexistent-zzz", &[]), ClassificationState::Green);
    }

    #[test]
    fn test_exact_hit_is_red() {
        let hits = [hit("1", Some(2)), hit("2", Some(0)), hit("3", None)];
        assert_eq!(classify("ToyWorld Teddy", &hits), ClassificationState::Red);
    }

    #[test]
    fn test_fuzzy_hits_are_orange() {
        let hits = [hit("1", Some(1)), hit("2", Some(2))];
        assert_eq!(classify("ToyWrld Tedy", &hits), ClassificationState::Orange);
    }

    #[test]
    fn test_missing_ranking_info_is_orange() {
        let hits = [hit("1", None)];
        assert_eq!(classify("teddy", &hits), ClassificationState::Orange);
    }

    #[test]
    fn test_min_typos() {
        assert_eq!(min_typos(&[]), None);
        assert_eq!(min_typos(&[hit("1", None)]), None);
        assert_eq!(min_typos(&[hit("1", Some(2)), hit("2", Some(1)), hit("3", None)]), Some(1));
    }

    #[test]
    fn test_state_wire_names() {
        assert_eq!(serde_json::to_string(&ClassificationState::Orange).unwrap(), "\"ORANGE\"");
        for state in ClassificationState::ALL {
            assert_eq!(state.to_string(), state.as_str());
        }
        assert!(ClassificationState::Idle.label().is_empty());
        assert!(ClassificationState::Red.is_warning());
        assert!(!ClassificationState::Green.is_warning());
    }

    fn arb_hits() -> impl Strategy<Value = Vec<RecallRecord>> {
        prop::collection::vec(prop::option::of(0u32..4), 0..12).prop_map(|typos| {
            typos
                .into_iter()
                .enumerate()
                .map(|(i, t)| hit(&i.to_string(), t))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_empty_query_always_idle(hits in arb_hits()) {
            prop_assert_eq!(classify("", &hits), ClassificationState::Idle);
        }

        #[test]
        fn prop_state_follows_min_typos(query in "[a-zA-Z][a-zA-Z ]{0,20}", hits in arb_hits()) {
            let expected = if hits.is_empty() {
                ClassificationState::Green
            } else if min_typos(&hits) == Some(0) {
                ClassificationState::Red
            } else {
                ClassificationState::Orange
            };
            prop_assert_eq!(classify(&query, &hits), expected);
        }

        #[test]
        fn prop_classify_is_idempotent(query in ".{0,16}", hits in arb_hits()) {
            prop_assert_eq!(classify(&query, &hits), classify(&query, &hits));
        }

        #[test]
        fn prop_order_is_irrelevant(query in "[a-z]{1,8}", mut hits in arb_hits()) {
            let before = classify(&query, &hits);
            hits.reverse();
            prop_assert_eq!(classify(&query, &hits), before);
        }
    }
}
