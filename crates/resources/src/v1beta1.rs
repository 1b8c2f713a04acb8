//! `tekton.dev/v1beta1` resource types.
//!
//! The beta revision renames the run service account field to
//! `serviceAccountName`, drops `PipelineResource`, and accepts the graceful
//! cancellation sentinels (`StoppedRunFinally`, `CancelledRunFinally`) in
//! `PipelineRun.spec.status`.

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Parameter value, either a plain string or a string array on the wire.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Array(Vec<String>),
}

/// Named parameter passed to a task or pipeline.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

/// Reference to a task by name.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct TaskRef {
    pub name: String,
}

/// Reference to a pipeline by name.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct PipelineRef {
    pub name: String,
}

/// One container step of a task.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

/// `Task` CRD.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(group = "tekton.dev", version = "v1beta1", kind = "Task")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamSpec>,
}

/// Declared parameter of a task or pipeline.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
}

/// One task entry within a pipeline.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTask {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<TaskRef>,
}

/// `Pipeline` CRD.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(group = "tekton.dev", version = "v1beta1", kind = "Pipeline")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<PipelineTask>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamSpec>,
}

/// `TaskRun` CRD.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(group = "tekton.dev", version = "v1beta1", kind = "TaskRun")]
#[kube(namespaced)]
#[kube(status = "RunStatus")]
#[serde(rename_all = "camelCase")]
pub struct TaskRunSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<TaskRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// `PipelineRun` CRD.
///
/// `spec.status` takes `Cancelled` for an unconditional stop or one of the
/// graceful sentinels to let in-flight tasks drain first.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(group = "tekton.dev", version = "v1beta1", kind = "PipelineRun")]
#[kube(namespaced)]
#[kube(status = "RunStatus")]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_ref: Option<PipelineRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Shared run status: appended conditions plus start/completion stamps.
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipelinerun_parses_from_manifest_yaml() {
        let yaml = r"
apiVersion: tekton.dev/v1beta1
kind: PipelineRun
metadata:
  name: build-and-push
  namespace: ci
spec:
  pipelineRef:
    name: build
  serviceAccountName: builder
  params:
    - name: revision
      value: main
";
        let pr: PipelineRun = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(pr.metadata.name.as_deref(), Some("build-and-push"));
        assert_eq!(pr.spec.pipeline_ref.as_ref().unwrap().name, "build");
        assert_eq!(pr.spec.service_account_name.as_deref(), Some("builder"));
        assert!(pr.status.is_none());
    }

    #[test]
    fn cancellation_marker_serializes_into_spec() {
        let spec = PipelineRunSpec {
            pipeline_ref: None,
            service_account_name: None,
            params: vec![],
            timeout: None,
            status: Some("StoppedRunFinally".to_string()),
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["status"], "StoppedRunFinally");
    }
}
