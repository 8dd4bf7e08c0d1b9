//! Serde helpers for loosely typed provider payloads.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept an identifier sent either as a JSON string or a number.
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Like [`id_string`], for optional fields.
pub fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "id_string")]
        id: String,
        #[serde(default, deserialize_with = "opt_id_string")]
        line: Option<String>,
    }

    #[test]
    fn numbers_and_strings() {
        let p: Sample = serde_json::from_str(r#"{"id": 3, "line": "35"}"#).unwrap();
        assert_eq!(p.id, "3");
        assert_eq!(p.line.as_deref(), Some("35"));

        let p: Sample = serde_json::from_str(r#"{"id": "301234"}"#).unwrap();
        assert_eq!(p.id, "301234");
        assert_eq!(p.line, None);
    }

    #[test]
    fn rejects_objects() {
        assert!(serde_json::from_str::<Sample>(r#"{"id": {}}"#).is_err());
    }
}
