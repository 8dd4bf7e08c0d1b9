//! Process configuration: command line, environment, and reply budgets.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::warn;

use crate::command::Command;

/// Default reply length in characters.
pub const DEFAULT_REPLY_CHARS: usize = 480;

/// How messages reach the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportMode {
    /// Read messages from the terminal
    Console,
    /// Accept messages over HTTP
    Http,
}

/// Command line options. Every option can also be set from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "transit-sms", version, about = "SMS assistant for Belgian public transport")]
pub struct Args {
    /// Canonical station list, one name per line
    #[arg(long, env = "STATIONS_FILE", default_value = "data/stations.txt")]
    pub stations: PathBuf,

    #[arg(long, env = "TRANSPORT_MODE", value_enum, default_value_t = TransportMode::Console)]
    pub mode: TransportMode,

    /// Listen address in HTTP mode
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    #[arg(long, env = "DELIJN_API_KEY", hide_env_values = true)]
    pub delijn_api_key: Option<String>,

    #[arg(long, env = "STIB_API_KEY", hide_env_values = true)]
    pub stib_api_key: Option<String>,

    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub google_maps_api_key: Option<String>,

    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub deepseek_api_key: Option<String>,

    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
    pub weather_api_key: Option<String>,
}

/// Provider credentials. Missing ones are empty strings; calls using them
/// fail at the provider and degrade like any other failure.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub regional_bus: String,
    pub city_transit: String,
    pub maps: String,
    pub completion: String,
    pub weather: String,
}

impl Args {
    /// Take the credentials, warning about each one that is missing.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            regional_bus: credential(&self.delijn_api_key, "DELIJN_API_KEY"),
            city_transit: credential(&self.stib_api_key, "STIB_API_KEY"),
            maps: credential(&self.google_maps_api_key, "GOOGLE_MAPS_API_KEY"),
            completion: credential(&self.deepseek_api_key, "DEEPSEEK_API_KEY"),
            weather: credential(&self.weather_api_key, "WEATHER_API_KEY"),
        }
    }
}

fn credential(value: &Option<String>, var: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => {
            warn!(var, "Credential not set. Calls to this provider will fail.");
            String::new()
        }
    }
}

/// Maximum reply length per command, in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyBudget {
    default: usize,
    overrides: HashMap<Command, usize>,
}

impl ReplyBudget {
    /// A budget table where every command gets `default`.
    pub fn new(default: usize) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn with_limit(mut self, command: Command, max_chars: usize) -> Self {
        self.overrides.insert(command, max_chars);
        self
    }

    /// Budget for `command`; unrecognized messages get the default.
    pub fn for_command(&self, command: Option<Command>) -> usize {
        command
            .and_then(|c| self.overrides.get(&c).copied())
            .unwrap_or(self.default)
    }
}

impl Default for ReplyBudget {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_CHARS)
            .with_limit(Command::Completion, 640)
            .with_limit(Command::YesNo, 160)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_defaults() {
        let budget = ReplyBudget::default();
        assert_eq!(budget.for_command(Some(Command::Completion)), 640);
        assert_eq!(budget.for_command(Some(Command::YesNo)), 160);
        assert_eq!(budget.for_command(Some(Command::Train)), 480);
        assert_eq!(budget.for_command(None), 480);
    }

    #[test]
    fn budget_override() {
        let budget = ReplyBudget::default().with_limit(Command::Bus, 300);
        assert_eq!(budget.for_command(Some(Command::Bus)), 300);
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "transit-sms",
            "--mode",
            "http",
            "--listen",
            "0.0.0.0:8080",
            "--stations",
            "/tmp/stations.txt",
        ])
        .unwrap();
        assert_eq!(args.mode, TransportMode::Http);
        assert_eq!(args.listen.port(), 8080);
        assert_eq!(args.stations, PathBuf::from("/tmp/stations.txt"));
    }

    #[test]
    fn blank_credential_is_missing() {
        let args = Args::try_parse_from(["transit-sms", "--weather-api-key", "  "]).unwrap();
        assert_eq!(args.credentials().weather, "");

        let args = Args::try_parse_from(["transit-sms", "--weather-api-key", "abc"]).unwrap();
        assert_eq!(args.credentials().weather, "abc");
    }
}
