//! Search result types.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::table::Field;

/// How a result was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Identifier bucket hit, or a name scoring exactly 1.0.
    Exact,
    /// Identifier substring containment.
    Partial,
    /// Scored name similarity below 1.0.
    Fuzzy,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Partial => "partial",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record's full field mapping plus match metadata.
///
/// Serializes as a flat map: the original fields in column order followed by
/// `_match_type`, `_similarity` and, for name searches, `_matched_key`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Row position in the table the result was produced from.
    pub row: usize,
    pub fields: Vec<Field>,
    pub match_type: MatchType,
    pub similarity: f64,
    pub matched_key: Option<String>,
}

impl SearchResult {
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.column == column)
            .map(|field| field.value.as_str())
    }
}

impl Serialize for SearchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = if self.matched_key.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(self.fields.len() + extra))?;
        for field in &self.fields {
            map.serialize_entry(&field.column, &field.value)?;
        }
        map.serialize_entry("_match_type", &self.match_type)?;
        map.serialize_entry("_similarity", &self.similarity)?;
        if let Some(key) = &self.matched_key {
            map.serialize_entry("_matched_key", key)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_fields_then_metadata() {
        let result = SearchResult {
            row: 4,
            fields: vec![
                Field {
                    column: "seat".to_string(),
                    value: "1002".to_string(),
                },
                Field {
                    column: "name".to_string(),
                    value: "Omar".to_string(),
                },
            ],
            match_type: MatchType::Fuzzy,
            similarity: 0.95,
            matched_key: Some("omar".to_string()),
        };
        let json = serde_json::to_string(&result).expect("serialize result");
        assert_eq!(
            json,
            r#"{"seat":"1002","name":"Omar","_match_type":"fuzzy","_similarity":0.95,"_matched_key":"omar"}"#
        );
    }

    #[test]
    fn matched_key_is_omitted_for_identifier_hits() {
        let result = SearchResult {
            row: 0,
            fields: Vec::new(),
            match_type: MatchType::Partial,
            similarity: 0.8,
            matched_key: None,
        };
        let json = serde_json::to_string(&result).expect("serialize result");
        assert_eq!(json, r#"{"_match_type":"partial","_similarity":0.8}"#);
        assert_eq!(result.match_type.to_string(), "partial");
    }
}
