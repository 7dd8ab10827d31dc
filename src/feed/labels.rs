//! Stored form of a post's labels.
//!
//! Labels are persisted as a JSON array of single-entry objects mapping the
//! label's index to its text: `[{"0":"Cat"},{"1":"Outdoor"}]`.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Serialize labels into their stored form.
pub fn encode(labels: &[String]) -> String {
    let entries: Vec<Value> = labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let mut entry = Map::new();
            entry.insert(index.to_string(), Value::String(label.clone()));
            Value::Object(entry)
        })
        .collect();

    Value::Array(entries).to_string()
}

/// Parse the stored form and flatten it into label strings.
///
/// Every value of every mapping is kept in encounter order; keys are ignored.
pub fn decode(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    let entries: Vec<LabelEntry> = serde_json::from_str(raw)?;
    Ok(entries.into_iter().flat_map(|entry| entry.0).collect())
}

/// Values of one mapping, in the order they appear in the document.
struct LabelEntry(Vec<String>);

impl<'de> Deserialize<'de> for LabelEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = LabelEntry;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping from label index to label text")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut values = Vec::new();
                while let Some((_index, label)) = map.next_entry::<de::IgnoredAny, String>()? {
                    values.push(label);
                }
                Ok(LabelEntry(values))
            }
        }

        deserializer.deserialize_map(EntryVisitor)
    }
}
