//! Tiered matching of free-text place fragments against the station index.
//!
//! A window of tokens grows from the start position one token at a time.
//! Every window is tested against three tiers in order of confidence:
//!
//! 1. **Exact**: the window is a station key.
//! 2. **Prefix**: the window is the leading component(s) of a key, as when
//!    the user drops a qualifier ("gent" for "gent-sint-pieters").
//! 3. **Partial**: the window is one component of a key.
//!
//! Each tier keeps its first hit only. When the scan ends the best tier that
//! hit wins. A bare clock token ("14", "14:30") ends the scan, since it can
//! never be part of a place name.

use crate::domain::is_clock_token;
use crate::stations::{CanonicalName, KEY_SEPARATOR, StationIndex, station_key};

/// Matching strategy, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    Exact,
    Prefix,
    Partial,
}

impl MatchTier {
    /// All tiers in priority order.
    pub const ALL: [MatchTier; 3] = [MatchTier::Exact, MatchTier::Prefix, MatchTier::Partial];

    /// First station (in source order) this tier accepts for `candidate`.
    fn find<'a>(self, candidate: &str, index: &'a StationIndex) -> Option<&'a CanonicalName> {
        match self {
            MatchTier::Exact => index.get(candidate),
            MatchTier::Prefix => {
                let prefix = format!("{candidate}{KEY_SEPARATOR}");
                index.iter().find(|name| name.key.starts_with(&prefix))
            }
            MatchTier::Partial => index
                .iter()
                .find(|name| name.key.split(KEY_SEPARATOR).any(|part| part == candidate)),
        }
    }
}

/// What one tier found over the whole scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOutcome<'a> {
    Hit {
        name: &'a CanonicalName,
        /// Token index just past the matching window.
        end: usize,
    },
    NoHit,
}

/// A resolved entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMatch<'a> {
    pub name: &'a CanonicalName,
    pub tier: MatchTier,
    /// Token index just past the match; parsing continues from here.
    pub end: usize,
}

/// Result of [`match_entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult<'a> {
    Matched(EntityMatch<'a>),
    /// Nothing matched; the cursor is unmoved.
    NoMatch { cursor: usize },
}

impl<'a> MatchResult<'a> {
    /// Where parsing should continue.
    pub fn cursor(&self) -> usize {
        match self {
            MatchResult::Matched(m) => m.end,
            MatchResult::NoMatch { cursor } => *cursor,
        }
    }

    /// The match, if any.
    pub fn matched(self) -> Option<EntityMatch<'a>> {
        match self {
            MatchResult::Matched(m) => Some(m),
            MatchResult::NoMatch { .. } => None,
        }
    }
}

/// Find the station named by the tokens starting at `start`.
pub fn match_entity<'a>(tokens: &[&str], start: usize, index: &'a StationIndex) -> MatchResult<'a> {
    let mut outcomes = [TierOutcome::NoHit; 3];

    for end in (start + 1)..=tokens.len() {
        if is_clock_token(tokens[end - 1]) {
            break;
        }

        let candidate = station_key(&tokens[start..end].join(" "));
        if candidate.is_empty() {
            continue;
        }

        for tier in MatchTier::ALL {
            let slot = &mut outcomes[tier as usize];
            if *slot != TierOutcome::NoHit {
                continue;
            }
            if let Some(name) = tier.find(&candidate, index) {
                *slot = TierOutcome::Hit { name, end };
            }
        }
    }

    select_best(start, &outcomes)
}

/// Pick the highest-priority tier that hit.
///
/// `outcomes` is indexed in [`MatchTier::ALL`] order.
pub fn select_best<'a>(start: usize, outcomes: &[TierOutcome<'a>; 3]) -> MatchResult<'a> {
    MatchTier::ALL
        .iter()
        .zip(outcomes)
        .find_map(|(&tier, outcome)| match *outcome {
            TierOutcome::Hit { name, end } => Some(EntityMatch { name, tier, end }),
            TierOutcome::NoHit => None,
        })
        .map_or(MatchResult::NoMatch { cursor: start }, MatchResult::Matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(names: &[&str]) -> StationIndex {
        StationIndex::from_names(names.iter().copied())
    }

    #[test]
    fn exact_multi_word_match_stops_at_time() {
        let idx = index(&["Brussel-Centraal", "Brussel-Noord"]);
        let tokens = ["brussel", "centraal", "14:30"];

        let m = match_entity(&tokens, 0, &idx).matched().unwrap();
        assert_eq!(m.name.key, "brussel-centraal");
        assert_eq!(m.tier, MatchTier::Exact);
        assert_eq!(m.end, 2);
    }

    #[test]
    fn prefix_when_no_exact_key() {
        let idx = index(&["Gent-Sint-Pieters"]);
        let m = match_entity(&["gent"], 0, &idx).matched().unwrap();
        assert_eq!(m.name.display, "Gent-Sint-Pieters");
        assert_eq!(m.tier, MatchTier::Prefix);
        assert_eq!(m.end, 1);
    }

    #[test]
    fn partial_is_last_resort() {
        let idx = index(&["Gent-Sint-Pieters", "Sint-Niklaas"]);
        let m = match_entity(&["pieters"], 0, &idx).matched().unwrap();
        assert_eq!(m.name.display, "Gent-Sint-Pieters");
        assert_eq!(m.tier, MatchTier::Partial);
    }

    #[test]
    fn exact_beats_earlier_prefix() {
        let idx = index(&["Leuven-Heverlee", "Leuven"]);
        let m = match_entity(&["leuven"], 0, &idx).matched().unwrap();
        assert_eq!(m.name.display, "Leuven");
        assert_eq!(m.tier, MatchTier::Exact);
    }

    #[test]
    fn source_order_breaks_ties() {
        let idx = index(&["Gent-Dampoort", "Gent-Sint-Pieters"]);
        let m = match_entity(&["gent"], 0, &idx).matched().unwrap();
        assert_eq!(m.name.display, "Gent-Dampoort");
    }

    #[test]
    fn accents_and_case_ignored() {
        let idx = index(&["Liège-Guillemins"]);
        let m = match_entity(&["LIEGE", "guillemins"], 0, &idx)
            .matched()
            .unwrap();
        assert_eq!(m.tier, MatchTier::Exact);
        assert_eq!(m.end, 2);
    }

    #[test]
    fn second_entity_continues_from_cursor() {
        let idx = index(&["Gent-Sint-Pieters", "Brussel-Centraal"]);
        let tokens = ["gent", "brussel", "centraal", "9"];

        let first = match_entity(&tokens, 0, &idx);
        assert_eq!(first.cursor(), 1);

        let second = match_entity(&tokens, first.cursor(), &idx).matched().unwrap();
        assert_eq!(second.name.display, "Brussel-Centraal");
        assert_eq!(second.end, 3);
    }

    #[test]
    fn no_match_leaves_cursor() {
        let idx = index(&["Leuven"]);
        let result = match_entity(&["foo", "bar"], 1, &idx);
        assert_eq!(result, MatchResult::NoMatch { cursor: 1 });
    }

    #[test]
    fn empty_tokens_no_match() {
        let idx = index(&["Leuven"]);
        assert_eq!(match_entity(&[], 0, &idx), MatchResult::NoMatch { cursor: 0 });
    }

    #[test]
    fn leading_time_token_ends_scan() {
        let idx = index(&["Leuven"]);
        assert_eq!(
            match_entity(&["14", "leuven"], 0, &idx),
            MatchResult::NoMatch { cursor: 0 }
        );
    }

    #[test]
    fn select_best_prefers_exact() {
        let idx = index(&["A-B", "A"]);
        let ab = idx.get("a-b").unwrap();
        let a = idx.get("a").unwrap();
        let outcomes = [
            TierOutcome::Hit { name: a, end: 1 },
            TierOutcome::Hit { name: ab, end: 1 },
            TierOutcome::NoHit,
        ];
        let best = select_best(0, &outcomes).matched().unwrap();
        assert_eq!(best.tier, MatchTier::Exact);
        assert_eq!(best.name.key, "a");
    }
}
