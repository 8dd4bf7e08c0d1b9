//! Accent- and case-insensitive text normalization.
//!
//! Applied symmetrically when building the station index and when matching
//! user input against it, so "Liège", "LIEGE" and "liege" all compare equal.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalize free text for matching.
///
/// Performs:
/// - lowercase folding
/// - canonical decomposition with combining marks removed
/// - whitespace collapsing and trimming
///
/// Total and idempotent.
///
/// # Examples
///
/// ```
/// use transit_sms::normalize::normalize;
///
/// assert_eq!(normalize("Liège"), "liege");
/// assert_eq!(normalize("  Sint-Niklaas   Station "), "sint-niklaas station");
/// assert_eq!(normalize(&normalize("Écaussinnes")), normalize("Écaussinnes"));
/// ```
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn idempotent(s in "[a-zA-Z0-9À-ÿ \t-]{0,40}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn case_insensitive(s in "[a-zA-Zà-ö \t-]{0,40}") {
            prop_assert_eq!(normalize(&s.to_uppercase()), normalize(&s));
        }

        #[test]
        fn no_surrounding_or_double_spaces(s in "[a-zé \t]{0,40}") {
            let n = normalize(&s);
            prop_assert_eq!(n.trim(), n.as_str());
            prop_assert!(!n.contains("  "));
        }
    }
}
