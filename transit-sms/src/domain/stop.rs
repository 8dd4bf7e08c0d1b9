//! Stop identifiers and directory search results.

use std::fmt;

/// A backing stop directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Regional bus network (scoped stop numbers).
    RegionalBus,
    /// City transit network (single compound stop ids).
    CityTransit,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::RegionalBus => f.write_str("regional-bus"),
            Provider::CityTransit => f.write_str("city-transit"),
        }
    }
}

/// Provider-specific stop identifier.
///
/// Only unique together with the [`Provider`] it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StopId {
    /// A local stop number unique within a scope (operator/region).
    Scoped { scope: String, number: String },
    /// A single id unique within the provider.
    Compound(String),
}

impl StopId {
    /// Create a scoped id.
    pub fn scoped(scope: impl Into<String>, number: impl Into<String>) -> Self {
        StopId::Scoped {
            scope: scope.into(),
            number: number.into(),
        }
    }

    /// Create a compound id.
    pub fn compound(id: impl Into<String>) -> Self {
        StopId::Compound(id.into())
    }

    /// The scope part, if this id has one.
    pub fn scope(&self) -> Option<&str> {
        match self {
            StopId::Scoped { scope, .. } => Some(scope),
            StopId::Compound(_) => None,
        }
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopId::Scoped { scope, number } => write!(f, "{scope}/{number}"),
            StopId::Compound(id) => f.write_str(id),
        }
    }
}

/// A stop returned by a directory search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StopCandidate {
    pub provider: Provider,
    pub id: StopId,
    /// Display name as reported by the provider.
    pub name: String,
}

impl StopCandidate {
    /// Create a new candidate.
    pub fn new(provider: Provider, id: StopId, name: impl Into<String>) -> Self {
        Self {
            provider,
            id,
            name: name.into(),
        }
    }
}
