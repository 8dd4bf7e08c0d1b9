//! Limits for route resolution.

/// Configuration parameters for the route resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum itinerary rows in a reply.
    pub max_routes: usize,

    /// Maximum stop candidates fetched per name.
    pub max_candidates: usize,

    /// Departures shown when no direct line exists.
    pub fallback_departures: usize,

    /// Departures shown on a single-stop board.
    pub board_departures: usize,
}

impl ResolverConfig {
    pub fn new(
        max_routes: usize,
        max_candidates: usize,
        fallback_departures: usize,
        board_departures: usize,
    ) -> Self {
        Self {
            max_routes,
            max_candidates,
            fallback_departures,
            board_departures,
        }
    }

    /// Set the maximum number of itinerary rows.
    pub fn with_max_routes(mut self, n: usize) -> Self {
        self.max_routes = n;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_routes: 3,
            max_candidates: 30,
            fallback_departures: 4,
            board_departures: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ResolverConfig::default();

        assert_eq!(config.max_routes, 3);
        assert_eq!(config.max_candidates, 30);
        assert_eq!(config.fallback_departures, 4);
        assert_eq!(config.board_departures, 6);
    }

    #[test]
    fn custom_config() {
        let config = ResolverConfig::new(5, 10, 2, 8).with_max_routes(1);

        assert_eq!(config.max_routes, 1);
        assert_eq!(config.max_candidates, 10);
        assert_eq!(config.fallback_departures, 2);
        assert_eq!(config.board_departures, 8);
    }
}
