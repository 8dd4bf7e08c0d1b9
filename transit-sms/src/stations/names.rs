//! Station name index.

use std::collections::HashMap;
use std::path::Path;

use crate::normalize::normalize;

use super::error::StationError;

/// Separator between the components of a station key.
pub const KEY_SEPARATOR: char = '-';

/// Build the lookup key for a station name or a run of user tokens.
///
/// Normalizes the text and joins its space- or dash-separated components
/// with [`KEY_SEPARATOR`], so "Brussel Centraal" and "brussel-centraal" share
/// a key.
pub fn station_key(text: &str) -> String {
    normalize(text)
        .split([' ', KEY_SEPARATOR])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// A station name with its lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalName {
    pub key: String,
    /// The name exactly as listed in the source.
    pub display: String,
}

/// Immutable station index.
///
/// Keys are unique; the first occurrence in source order wins.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    names: Vec<CanonicalName>,
    by_key: HashMap<String, usize>,
}

impl StationIndex {
    /// Build an index from names in priority order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for name in names {
            index.push(name.as_ref());
        }
        index
    }

    /// Parse the station list format: one name per line, blank lines and
    /// lines starting with `#` ignored.
    pub fn parse(source: &str) -> Self {
        Self::from_names(
            source
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Load the station list from disk.
    ///
    /// Fails if the file is unreadable or holds no names.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StationError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| StationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let index = Self::parse(&source);
        if index.is_empty() {
            return Err(StationError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(index)
    }

    fn push(&mut self, display: &str) {
        let key = station_key(display);
        if key.is_empty() || self.by_key.contains_key(&key) {
            return;
        }
        self.by_key.insert(key.clone(), self.names.len());
        self.names.push(CanonicalName {
            key,
            display: display.to_string(),
        });
    }

    /// Look up a name by its exact key.
    pub fn get(&self, key: &str) -> Option<&CanonicalName> {
        self.by_key.get(key).map(|&i| &self.names[i])
    }

    /// All names in source order.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalName> {
        self.names.iter()
    }

    /// Get the number of stations in the index.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
