//! Common read-view of run objects and the execution-state classifier.

use std::fmt;

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use resources::{Condition, ConditionStatus};
use serde_json::Value;

/// Version-independent snapshot of a TaskRun or PipelineRun.
///
/// Built from a freshly fetched document every time; never held across a
/// remote call, because the platform advances the run asynchronously and a
/// stale snapshot would misclassify the state.
#[derive(Clone, Debug)]
pub struct RunObject {
    pub name: String,
    pub namespace: String,
    pub created: Option<DateTime<Utc>>,
    pub conditions: Vec<Condition>,
}

impl RunObject {
    /// Extract the view from an untyped wire document, tolerating absent or
    /// unrecognized fields (forward compatibility for versions without
    /// compiled-in structs).
    #[must_use]
    pub fn from_document(document: &Value) -> Self {
        let meta = &document["metadata"];
        let conditions = document["status"]["conditions"]
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|c| serde_json::from_value(c.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            name: meta["name"].as_str().unwrap_or_default().to_string(),
            namespace: meta["namespace"].as_str().unwrap_or_default().to_string(),
            created: meta["creationTimestamp"]
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc)),
            conditions,
        }
    }

    fn from_parts(meta: ObjectMeta, conditions: Vec<Condition>) -> Self {
        Self {
            name: meta.name.unwrap_or_default(),
            namespace: meta.namespace.unwrap_or_default(),
            created: meta.creation_timestamp.map(|t| t.0),
            conditions,
        }
    }

    /// The most recently appended condition of type `Succeeded` or `Ready`.
    /// Older entries of those types are history and ignored.
    #[must_use]
    pub fn latest_authoritative_condition(&self) -> Option<&Condition> {
        self.conditions
            .iter()
            .rev()
            .find(|c| c.condition_type == "Succeeded" || c.condition_type == "Ready")
    }

    /// Classify the run's execution state from its latest authoritative
    /// condition. A run with no such condition yet (status not populated) is
    /// treated as running.
    #[must_use]
    pub fn state(&self) -> RunState {
        match self.latest_authoritative_condition() {
            None => RunState::Running,
            Some(condition) => match condition.status {
                ConditionStatus::Unknown => RunState::Running,
                ConditionStatus::True => RunState::Succeeded,
                ConditionStatus::False => {
                    RunState::Finished(TerminalReason::from_reason(condition.reason.as_deref()))
                }
            },
        }
    }

    /// Short status text for list output.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        match self.state() {
            RunState::Running => "Running",
            RunState::Succeeded => "Succeeded",
            RunState::Finished(TerminalReason::Cancelled) => "Cancelled",
            RunState::Finished(TerminalReason::TimedOut) => "TimedOut",
            RunState::Finished(TerminalReason::Failed) => "Failed",
        }
    }
}

impl From<resources::v1alpha1::TaskRun> for RunObject {
    fn from(run: resources::v1alpha1::TaskRun) -> Self {
        let conditions = run.status.map(|s| s.conditions).unwrap_or_default();
        Self::from_parts(run.metadata, conditions)
    }
}

impl From<resources::v1alpha1::PipelineRun> for RunObject {
    fn from(run: resources::v1alpha1::PipelineRun) -> Self {
        let conditions = run.status.map(|s| s.conditions).unwrap_or_default();
        Self::from_parts(run.metadata, conditions)
    }
}

impl From<resources::v1beta1::TaskRun> for RunObject {
    fn from(run: resources::v1beta1::TaskRun) -> Self {
        let conditions = run.status.map(|s| s.conditions).unwrap_or_default();
        Self::from_parts(run.metadata, conditions)
    }
}

impl From<resources::v1beta1::PipelineRun> for RunObject {
    fn from(run: resources::v1beta1::PipelineRun) -> Self {
        let conditions = run.status.map(|s| s.conditions).unwrap_or_default();
        Self::from_parts(run.metadata, conditions)
    }
}

/// Execution state of a run as far as cancellation legality is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// In progress or not yet started; a cancellation request is legal.
    Running,
    /// Completed successfully. Terminal.
    Succeeded,
    /// Ended without success, whatever the reason. Terminal.
    Finished(TerminalReason),
}

impl RunState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("is still running"),
            Self::Succeeded => f.write_str("has already succeeded"),
            Self::Finished(TerminalReason::Cancelled) => f.write_str("was already cancelled"),
            Self::Finished(TerminalReason::TimedOut) => f.write_str("has timed out"),
            Self::Finished(TerminalReason::Failed) => f.write_str("has already failed"),
        }
    }
}

/// Closed mapping of the platform's terminal reason sentinels.
///
/// The distinction never affects cancellation legality, only the message
/// reported back; unknown reasons fall through to `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalReason {
    Cancelled,
    TimedOut,
    Failed,
}

impl TerminalReason {
    #[must_use]
    pub fn from_reason(reason: Option<&str>) -> Self {
        match reason {
            Some(
                "TaskRunCancelled" | "PipelineRunCancelled" | "Cancelled" | "StoppedRunFinally"
                | "CancelledRunFinally",
            ) => Self::Cancelled,
            Some("TaskRunTimeout" | "PipelineRunTimeout") => Self::TimedOut,
            _ => Self::Failed,
        }
    }
}
