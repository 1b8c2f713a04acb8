//! Knative-style status conditions shared by every run resource version.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tri-state condition status as it appears on the wire.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// One entry of a run object's `status.conditions` list.
///
/// Conditions are appended over time; the last entry for a given type is the
/// current one, older entries are history.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl Condition {
    /// Build a condition with just type and status, the minimum the platform
    /// writes for a freshly started run.
    #[must_use]
    pub fn new(condition_type: &str, status: ConditionStatus) -> Self {
        Self {
            condition_type: condition_type.to_string(),
            status,
            reason: None,
            message: None,
            last_transition_time: None,
        }
    }

    /// Same, with the platform-assigned reason sentinel attached.
    #[must_use]
    pub fn with_reason(condition_type: &str, status: ConditionStatus, reason: &str) -> Self {
        Self {
            reason: Some(reason.to_string()),
            ..Self::new(condition_type, status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_round_trips_wire_names() {
        let c = Condition::with_reason("Succeeded", ConditionStatus::False, "PipelineRunCancelled");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "Succeeded");
        assert_eq!(json["status"], "False");
        assert_eq!(json["reason"], "PipelineRunCancelled");

        let back: Condition = serde_json::from_value(json).unwrap();
        assert_eq!(back.status, ConditionStatus::False);
    }

    #[test]
    fn unknown_status_parses() {
        let c: Condition =
            serde_json::from_str(r#"{"type":"Ready","status":"Unknown"}"#).unwrap();
        assert_eq!(c.status, ConditionStatus::Unknown);
        assert!(c.reason.is_none());
    }
}
