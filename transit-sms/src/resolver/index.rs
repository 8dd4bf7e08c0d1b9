//! Destination-side line index.
//!
//! Answers "does this line reach the destination, and under which stop
//! name?" for both passes of the resolver. Pass 1 asks by scoped key; Pass 2
//! only knows a bare line id and asks by that.

use std::collections::HashMap;

use crate::domain::LineKey;

#[derive(Debug, Default)]
pub struct DestinationIndex {
    by_key: HashMap<LineKey, String>,
    by_line: HashMap<String, String>,
}

impl DestinationIndex {
    /// Record that the line under `key` serves stop `name`.
    ///
    /// The first stop recorded for a key (and for a bare line id) wins.
    pub fn insert(&mut self, key: LineKey, name: &str) {
        self.by_line
            .entry(key.line.clone())
            .or_insert_with(|| name.to_string());
        self.by_key.entry(key).or_insert_with(|| name.to_string());
    }

    /// Destination stop for a scoped key.
    pub fn get(&self, key: &LineKey) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    /// Destination stop for a bare line id, ignoring scope.
    pub fn get_line(&self, line: &str) -> Option<&str> {
        self.by_line.get(line).map(String::as_str)
    }

    /// Whether any destination stop is served by `line`, in any scope.
    pub fn serves_line(&self, line: &str) -> bool {
        self.by_line.contains_key(line)
    }

    /// Distinct bare line ids, sorted.
    pub fn lines(&self) -> Vec<&str> {
        let mut lines: Vec<_> = self.by_line.keys().map(String::as_str).collect();
        lines.sort_unstable();
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_writer_wins() {
        let mut index = DestinationIndex::default();
        index.insert(LineKey::scoped("3", "35"), "Aarschot Station");
        index.insert(LineKey::scoped("3", "35"), "Aarschot Markt");
        index.insert(LineKey::scoped("1", "35"), "Aarschot Markt");

        assert_eq!(index.get(&LineKey::scoped("3", "35")), Some("Aarschot Station"));
        assert_eq!(index.get(&LineKey::scoped("1", "35")), Some("Aarschot Markt"));
        assert_eq!(index.get_line("35"), Some("Aarschot Station"));
    }

    #[test]
    fn bare_line_ignores_scope() {
        let mut index = DestinationIndex::default();
        index.insert(LineKey::scoped("1", "2"), "Kessel-Lo");
        index.insert(LineKey::unscoped("81"), "Montgomery");

        assert!(index.serves_line("2"));
        assert!(index.serves_line("81"));
        assert!(!index.serves_line("3"));
        assert_eq!(index.get(&LineKey::scoped("3", "2")), None);
        assert_eq!(index.lines(), vec!["2", "81"]);
    }
}
