//! Plain serializable form of a roadmap, as it crosses storage and network boundaries.

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Top-level key of the retired document shape. Its presence is a deliberate version break.
const LEGACY_KEY: &str = "periods";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub roadmap_name: String,
    #[serde(default)]
    pub milestones: Vec<MilestoneSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub current_completion_date: String,
    #[serde(default)]
    pub original_completion_date: String,
    #[serde(default)]
    pub items: Vec<ItemSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub status: String,
}

impl Snapshot {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            roadmap_name: name.into(),
            milestones: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Result of reading a stored roadmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(Snapshot),
    /// Nothing stored yet. Not an error: the editor starts empty.
    NotFound,
    /// Data written by a retired format version.
    IncompatibleFormat,
    Corrupt(String),
}

impl LoadOutcome {
    /// Classify raw stored text.
    pub fn from_raw(raw: &str) -> Self {
        Self::from_decoded(decode(raw))
    }

    /// Classify an already parsed JSON value, e.g. a column of a remote row.
    pub fn from_value(value: serde_json::Value) -> Self {
        Self::from_decoded(decode_value(value))
    }

    fn from_decoded(decoded: Result<Snapshot, FormatError>) -> Self {
        match decoded {
            Ok(snapshot) => LoadOutcome::Loaded(snapshot),
            Err(FormatError::Incompatible) => LoadOutcome::IncompatibleFormat,
            Err(e) => LoadOutcome::Corrupt(e.to_string()),
        }
    }
}

/// Parse stored text, telling a retired format apart from plain corruption.
pub fn decode(raw: &str) -> Result<Snapshot, FormatError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| FormatError::Corrupt(e.to_string()))?;
    decode_value(value)
}

pub fn decode_value(value: serde_json::Value) -> Result<Snapshot, FormatError> {
    let Some(object) = value.as_object() else {
        return Err(FormatError::Corrupt("expected a JSON object".into()));
    };
    if object.contains_key(LEGACY_KEY) {
        return Err(FormatError::Incompatible);
    }
    serde_json::from_value(value).map_err(|e| FormatError::Corrupt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_shape_is_incompatible_not_corrupt() {
        let raw = r#"{"roadmapName":"Old","periods":[{"title":"Q1"}]}"#;
        assert_eq!(decode(raw), Err(FormatError::Incompatible));
        assert_eq!(decode(r#"{"periods":[]}"#), Err(FormatError::Incompatible));
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(matches!(decode("{not json"), Err(FormatError::Corrupt(_))));
        assert!(matches!(decode("[1,2,3]"), Err(FormatError::Corrupt(_))));
        assert!(matches!(
            decode(r#"{"milestones":[]}"#),
            Err(FormatError::Corrupt(_))
        ));
        assert!(matches!(
            decode(r#"{"roadmapName":"x","milestones":{}}"#),
            Err(FormatError::Corrupt(_))
        ));
    }

    #[test]
    fn name_only_snapshot_has_no_milestones() {
        let snap = decode(r#"{"roadmapName":"Launch"}"#).unwrap();
        assert_eq!(snap, Snapshot::empty("Launch"));
    }

    #[test]
    fn uses_camel_case_keys() {
        let snap = Snapshot {
            roadmap_name: "R".into(),
            milestones: vec![MilestoneSnapshot {
                id: Some("milestone-1".into()),
                current_completion_date: "2025-06-01".into(),
                ..Default::default()
            }],
        };
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"roadmapName\":\"R\""));
        assert!(json.contains("\"currentCompletionDate\":\"2025-06-01\""));
        assert!(json.contains("\"originalCompletionDate\":\"\""));
    }
}
