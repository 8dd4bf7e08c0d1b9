//! Fixed vocabulary: multi-word transit triggers, place separators and
//! trailing clock times.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

use crate::domain::parse_clock;

use super::intent::{Language, TransitMode};

/// Separator phrases between two places ("leuven naar aarschot").
static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:naar|to|vers|nach)(?:\s+|$)").expect("valid regex")
});

/// Separator words, for token-level scans.
pub const SEPARATOR_WORDS: &[&str] = &["naar", "to", "vers", "nach"];

/// Words after which a number is a platform, not a time.
pub const PLATFORM_KEYWORDS: &[&str] = &[
    "perron", "spoor", "platform", "track", "quai", "voie", "gleis", "binario",
];

pub(crate) const ALL_MODES: &[TransitMode] = &[
    TransitMode::Bus,
    TransitMode::Tram,
    TransitMode::Subway,
    TransitMode::Train,
];

/// A fixed trigger for transit directions and the defaults it implies.
#[derive(Debug, PartialEq, Eq)]
pub struct TransitTrigger {
    pub words: &'static [&'static str],
    pub modes: &'static [TransitMode],
    pub max_routes: usize,
    pub language: Language,
    /// Appended to both place names to keep geocoding local.
    pub locality: Option<&'static str>,
}

pub const TRANSIT_TRIGGERS: &[TransitTrigger] = &[
    TransitTrigger {
        words: &["ov"],
        modes: ALL_MODES,
        max_routes: 3,
        language: Language::Dutch,
        locality: None,
    },
    TransitTrigger {
        words: &["ov", "trein"],
        modes: &[TransitMode::Train],
        max_routes: 3,
        language: Language::Dutch,
        locality: None,
    },
    TransitTrigger {
        words: &["ov", "bus"],
        modes: &[TransitMode::Bus, TransitMode::Tram],
        max_routes: 3,
        language: Language::Dutch,
        locality: None,
    },
    TransitTrigger {
        words: &["ov", "brussel"],
        modes: &[TransitMode::Bus, TransitMode::Tram, TransitMode::Subway],
        max_routes: 3,
        language: Language::Dutch,
        locality: Some(", Brussel"),
    },
    TransitTrigger {
        words: &["trajet"],
        modes: ALL_MODES,
        max_routes: 3,
        language: Language::French,
        locality: None,
    },
];

/// Triggers the lowercased words start with, longest first.
pub fn matching_triggers(lowered: &[String]) -> Vec<&'static TransitTrigger> {
    let mut triggers: Vec<&'static TransitTrigger> = TRANSIT_TRIGGERS
        .iter()
        .filter(|trigger| {
            lowered.len() >= trigger.words.len()
                && trigger.words.iter().zip(lowered).all(|(w, l)| *w == l.as_str())
        })
        .collect();
    triggers.sort_by_key(|trigger| std::cmp::Reverse(trigger.words.len()));
    triggers
}

/// Split "X naar Y" into its two trimmed, non-empty sides.
pub fn split_place_pair(body: &str) -> Option<(String, String)> {
    let mut parts = SEPARATOR.splitn(body, 2);
    let from = parts.next()?.trim();
    let to = parts.next()?.trim();
    if from.is_empty() || to.is_empty() {
        return None;
    }
    Some((from.to_string(), to.to_string()))
}

/// Strip a trailing clock time from a place name.
///
/// The last token is only taken as a time when something precedes it and
/// that something is not a platform keyword ("perron 3" stays a place).
pub fn split_time_suffix(text: &str) -> (String, Option<NaiveTime>) {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    if let [head @ .., prev, last] = tokens.as_slice()
        && !PLATFORM_KEYWORDS.contains(&prev.to_lowercase().as_str())
        && let Ok(time) = parse_clock(last)
    {
        let mut kept = head.to_vec();
        kept.push(*prev);
        return (kept.join(" "), Some(time));
    }

    (tokens.join(" "), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lowered(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_lowercase).collect()
    }

    #[test]
    fn longest_trigger_first() {
        fn words(text: &str) -> Vec<&'static [&'static str]> {
            matching_triggers(&lowered(text)).iter().map(|t| t.words).collect()
        }
        assert_eq!(words("ov trein a naar b"), [&["ov", "trein"][..], &["ov"][..]]);
        assert_eq!(words("ov a naar b"), [&["ov"][..]]);
        assert_eq!(
            matching_triggers(&lowered("trajet a vers b"))[0].language,
            Language::French
        );
        assert!(matching_triggers(&lowered("ovation a naar b")).is_empty());
        assert!(matching_triggers(&[]).is_empty());
    }

    #[test]
    fn place_pair_separators() {
        assert_eq!(
            split_place_pair("Leuven NAAR Aarschot"),
            Some(("Leuven".into(), "Aarschot".into()))
        );
        assert_eq!(
            split_place_pair("Gare du Midi vers Flagey"),
            Some(("Gare du Midi".into(), "Flagey".into()))
        );
        assert_eq!(
            split_place_pair("a to b to c"),
            Some(("a".into(), "b to c".into()))
        );
        assert_eq!(split_place_pair("leuven naar"), None);
        assert_eq!(split_place_pair("leuven"), None);
        assert_eq!(split_place_pair("tornooiveld"), None);
    }

    #[test]
    fn trailing_time_forms() {
        let t = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(split_time_suffix("aarschot 14:30"), ("aarschot".into(), Some(t)));
        assert_eq!(split_time_suffix("aarschot 14.30"), ("aarschot".into(), Some(t)));
        assert_eq!(split_time_suffix("aarschot 1430"), ("aarschot".into(), Some(t)));
        assert_eq!(
            split_time_suffix("aarschot station 9"),
            ("aarschot station".into(), NaiveTime::from_hms_opt(9, 0, 0))
        );
    }

    #[test]
    fn platform_number_is_not_a_time() {
        assert_eq!(
            split_time_suffix("aarschot perron 3"),
            ("aarschot perron 3".into(), None)
        );
        assert_eq!(
            split_time_suffix("Leuven Spoor 12"),
            ("Leuven Spoor 12".into(), None)
        );
    }

    #[test]
    fn lone_number_is_kept() {
        assert_eq!(split_time_suffix("14"), ("14".into(), None));
        assert_eq!(split_time_suffix("aarschot"), ("aarschot".into(), None));
    }
}
