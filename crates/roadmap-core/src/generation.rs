//! Wire types for roadmap generation from a project description.

use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::snapshot::{MilestoneSnapshot, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub project_description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationErrorBody {
    pub error: String,
}

/// Check a generation response before anything is rendered from it.
///
/// A non-string `roadmapName` or a non-array `milestones` rejects the whole
/// response; nothing is partially accepted.
pub fn validate_response(value: serde_json::Value) -> Result<Snapshot, FormatError> {
    let name = value
        .get("roadmapName")
        .and_then(|v| v.as_str())
        .ok_or_else(|| FormatError::Incomplete("missing roadmap name".into()))?
        .to_string();
    let milestones = value
        .get("milestones")
        .and_then(|v| v.as_array())
        .ok_or_else(|| FormatError::Incomplete("missing milestones".into()))?;

    let milestones = milestones
        .iter()
        .map(|m| {
            if !m.is_object() {
                return Err(FormatError::Incomplete("milestone is not an object".into()));
            }
            serde_json::from_value::<MilestoneSnapshot>(m.clone())
                .map_err(|e| FormatError::Incomplete(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Snapshot {
        roadmap_name: name,
        milestones,
    })
}
