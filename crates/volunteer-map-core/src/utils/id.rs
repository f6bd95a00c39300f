//! Identifier deserialization.
//!
//! The events API hands out ids as strings, but json-server style backends
//! return numbers for users. Both are read into a `String`.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|id| id.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
        #[serde(default, deserialize_with = "deserialize_optional_id")]
        other: Option<String>,
    }

    #[test]
    fn test_string_and_number_ids() {
        let h: Holder = serde_json::from_str(r#"{"id":"abc","other":7}"#).unwrap();
        assert_eq!(h.id, "abc");
        assert_eq!(h.other.as_deref(), Some("7"));

        let h: Holder = serde_json::from_str(r#"{"id":12}"#).unwrap();
        assert_eq!(h.id, "12");
        assert_eq!(h.other, None);

        let h: Holder = serde_json::from_str(r#"{"id":"x","other":null}"#).unwrap();
        assert_eq!(h.other, None);
    }

    #[test]
    fn test_rejects_other_types() {
        assert!(serde_json::from_str::<Holder>(r#"{"id":true}"#).is_err());
    }
}
