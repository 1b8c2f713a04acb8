//! `tekton.dev/v1alpha1` resource types.
//!
//! The oldest served revision. Differences from `v1beta1` that matter to this
//! client: the run service account field is `serviceAccount` (not
//! `serviceAccountName`) and `PipelineResource` exists only here.

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

/// `Task` CRD: an ordered list of steps.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(group = "tekton.dev", version = "v1alpha1", kind = "Task")]
#[kube(namespaced)]
pub struct TaskSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
}

/// One task entry within a pipeline.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTask {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<TaskRef>,
}

/// `Pipeline` CRD: a graph of task references.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(group = "tekton.dev", version = "v1alpha1", kind = "Pipeline")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<PipelineTask>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
}

/// Typed input/output resource parameter.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
pub struct ResourceParam {
    pub name: String,
    pub value: String,
}

/// `PipelineResource` CRD, v1alpha1 only.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(group = "tekton.dev", version = "v1alpha1", kind = "PipelineResource")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResourceSpec {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ResourceParam>,
}

/// `TaskRun` CRD: one execution of a task.
///
/// `spec.status` is the cancellation marker; writing `TaskRunCancelled` there
/// asks the platform to tear the run down.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(group = "tekton.dev", version = "v1alpha1", kind = "TaskRun")]
#[kube(namespaced)]
#[kube(status = "RunStatus")]
#[serde(rename_all = "camelCase")]
pub struct TaskRunSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<TaskRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// `PipelineRun` CRD: one execution of a pipeline.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(group = "tekton.dev", version = "v1alpha1", kind = "PipelineRun")]
#[kube(namespaced)]
#[kube(status = "RunStatus")]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_ref: Option<PipelineRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
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
