//! Store-assigned identifiers are opaque: the store may hand them out as JSON
//! numbers or strings, the client only ever compares and echoes them back.

use serde::{Deserialize, Deserializer, de::Error};
use serde_json::Value;

fn value_to_id<E: Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!(
            "expected a string or number identifier, got {}",
            other
        ))),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    value_to_id(Value::deserialize(deserializer)?)
}

pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value_to_id(value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "super::deserialize")]
        id: String,
        #[serde(default, deserialize_with = "super::deserialize_opt")]
        parent: Option<String>,
    }

    #[test]
    fn test_numeric_and_string_ids_are_both_accepted() {
        let numeric: Holder = serde_json::from_str(r#"{"id": 7, "parent": "a1"}"#).unwrap();
        assert_eq!(numeric.id, "7");
        assert_eq!(numeric.parent.as_deref(), Some("a1"));

        let textual: Holder = serde_json::from_str(r#"{"id": "x9"}"#).unwrap();
        assert_eq!(textual.id, "x9");
        assert!(textual.parent.is_none());
    }

    #[test]
    fn test_object_id_is_rejected() {
        let result = serde_json::from_str::<Holder>(r#"{"id": {"nested": true}}"#);
        assert!(result.is_err());
    }
}
