//! Wire types of the rail connections API.
//!
//! Numbers arrive as strings (`"time": "1710509400"`), a single via may
//! arrive as an object instead of a list, and most fields are optional.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct ConnectionsResponse {
    #[serde(default)]
    pub connection: Vec<ConnectionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ConnectionRecord {
    pub departure: EventRecord,
    pub arrival: EventRecord,
    #[serde(default)]
    pub vias: Option<ViasRecord>,
}

/// A departure or arrival at one station.
#[derive(Debug, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub station: String,
    #[serde(default)]
    pub stationinfo: Option<StationInfo>,
    #[serde(deserialize_with = "flexible_i64")]
    pub time: i64,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub delay: i64,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub platforminfo: Option<PlatformInfo>,
}

#[derive(Debug, Deserialize)]
pub struct StationInfo {
    #[serde(default)]
    pub standardname: String,
}

#[derive(Debug, Deserialize)]
pub struct PlatformInfo {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ViasRecord {
    #[serde(default, deserialize_with = "flexible_i64")]
    pub number: i64,
    #[serde(default)]
    pub via: Option<OneOrMany<ViaRecord>>,
}

#[derive(Debug, Deserialize)]
pub struct ViaRecord {
    pub arrival: EventRecord,
    pub departure: EventRecord,
    #[serde(default)]
    pub station: String,
    #[serde(default)]
    pub stationinfo: Option<StationInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Accept an integer sent either as a JSON number or as a string.
fn flexible_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| de::Error::custom(format!("not an integer: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("not an integer: {s:?}"))),
        other => Err(de::Error::custom(format!("expected an integer, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_as_strings_or_numbers() {
        let event: EventRecord =
            serde_json::from_str(r#"{"station": "Leuven", "time": "1710509400", "delay": 120}"#)
                .unwrap();
        assert_eq!(event.time, 1_710_509_400);
        assert_eq!(event.delay, 120);
        assert!(event.platforminfo.is_none());
    }

    #[test]
    fn missing_delay_defaults_to_zero() {
        let event: EventRecord = serde_json::from_str(r#"{"time": 1710509400}"#).unwrap();
        assert_eq!(event.delay, 0);
        assert_eq!(event.station, "");
    }

    #[test]
    fn garbage_time_rejected() {
        assert!(serde_json::from_str::<EventRecord>(r#"{"time": "soon"}"#).is_err());
    }

    #[test]
    fn single_via_as_object() {
        let vias: ViasRecord = serde_json::from_str(
            r#"{"number": "1", "via": {
                "station": "Brussel-Zuid",
                "arrival": {"time": "1"},
                "departure": {"time": "2"}
            }}"#,
        )
        .unwrap();
        assert_eq!(vias.number, 1);
        assert_eq!(vias.via.unwrap().into_vec().len(), 1);
    }

    #[test]
    fn empty_response() {
        let response: ConnectionsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.connection.is_empty());
    }
}
