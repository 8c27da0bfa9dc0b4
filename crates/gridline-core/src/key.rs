//! Composite row keys.

use crate::value::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator placed between field values of a composite key.
pub const KEY_SEPARATOR: char = '|';

/// Key identifying a record within one render.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey(String);

impl RowKey {
    /// Create a key from its text.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key derived from a row position, used when records lack identity.
    #[must_use]
    pub fn positional(index: usize) -> Self {
        Self(format!("#{index}"))
    }

    /// Key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The fields whose values identify a record, e.g. `"id"` or `"region,id"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyField {
    fields: Vec<String>,
}

impl KeyField {
    /// Parse a comma-joined field list. Blank entries are dropped.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        Self {
            fields: spec
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Field names in key order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// No fields configured: records have no identity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Composite key of a record. Absent fields contribute an empty segment.
    #[must_use]
    pub fn key_of(&self, record: &Record) -> RowKey {
        let mut key = String::new();
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                key.push(KEY_SEPARATOR);
            }
            if let Some(value) = record.display(field) {
                key.push_str(&value);
            }
        }
        RowKey(key)
    }

    /// Key of a record at a view position, positional when no fields are set.
    #[must_use]
    pub fn key_at(&self, record: &Record, index: usize) -> RowKey {
        if self.is_empty() {
            RowKey::positional(index)
        } else {
            self.key_of(record)
        }
    }
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.join(","))
    }
}

impl Serialize for KeyField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyField {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| Self::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single() {
        let kf = KeyField::parse("id");
        assert_eq!(kf.fields(), &["id"]);
    }

    #[test]
    fn test_parse_composite_trims() {
        let kf = KeyField::parse(" region , id ,");
        assert_eq!(kf.fields(), &["region", "id"]);
        assert_eq!(kf.to_string(), "region,id");
    }

    #[test]
    fn test_key_of_composite() {
        let kf = KeyField::parse("region,id");
        let record = Record::new().cell("region", "eu").cell("id", 7);
        assert_eq!(kf.key_of(&record).as_str(), "eu|7");
    }

    #[test]
    fn test_key_of_missing_field() {
        let kf = KeyField::parse("a,b");
        let record = Record::new().cell("b", "x");
        assert_eq!(kf.key_of(&record).as_str(), "|x");
    }

    #[test]
    fn test_positional_fallback() {
        let kf = KeyField::default();
        assert!(kf.is_empty());
        assert_eq!(kf.key_at(&Record::new(), 3), RowKey::positional(3));
    }

    #[test]
    fn test_deserialize_from_string() {
        let kf: KeyField = serde_json::from_str(r#""a,b""#).unwrap();
        assert_eq!(kf.fields().len(), 2);
    }
}
