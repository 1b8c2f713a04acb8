//! Resource operation contracts: ordering, not-found mapping, create.

use client::ops::{pipelinerun, task, taskrun};
use client::test_support::{named_document, run_document, FakeCluster};
use client::{Error, RunState, SchemaVersion};
use serde_json::json;

#[tokio::test]
async fn list_orders_by_creation_then_name() {
    let cluster = FakeCluster::new()
        .serving(SchemaVersion::V1beta1, &["tasks"])
        .with_object(named_document(
            "tekton.dev/v1beta1",
            "Task",
            "task2",
            "ns",
            "2024-05-01T10:00:00Z",
        ))
        .with_object(named_document(
            "tekton.dev/v1beta1",
            "Task",
            "task",
            "ns",
            "2024-05-01T10:00:00Z",
        ))
        .with_object(named_document(
            "tekton.dev/v1beta1",
            "Task",
            "zz-oldest",
            "ns",
            "2024-05-01T09:00:00Z",
        ));

    let names = task::list_names(&cluster, "ns").await.unwrap();
    assert_eq!(names, vec!["zz-oldest", "task", "task2"]);
}

#[tokio::test]
async fn disjoint_namespace_lists_empty() {
    let cluster = FakeCluster::new()
        .serving(SchemaVersion::V1beta1, &["tasks"])
        .with_object(named_document(
            "tekton.dev/v1beta1",
            "Task",
            "task",
            "ns",
            "2024-05-01T10:00:00Z",
        ));

    let items = task::list(&cluster, "unknown").await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn unserved_kind_fails_to_list() {
    let cluster = FakeCluster::new();
    let err = task::list(&cluster, "ns").await.unwrap_err();
    assert!(matches!(err, Error::NotServed { .. }));
}

#[tokio::test]
async fn get_maps_absence_to_not_found() {
    let cluster = FakeCluster::new().serving(SchemaVersion::V1beta1, &["tasks"]);
    let err = task::get(&cluster, "missing", "ns").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to find Task: missing in namespace ns"
    );
}

#[tokio::test]
async fn get_returns_the_named_object() {
    let cluster = FakeCluster::new()
        .serving(SchemaVersion::V1beta1, &["tasks"])
        .with_object(named_document(
            "tekton.dev/v1beta1",
            "Task",
            "task",
            "ns",
            "2024-05-01T10:00:00Z",
        ));

    let doc = task::get(&cluster, "task", "ns").await.unwrap();
    assert_eq!(doc["metadata"]["name"], "task");
}

#[tokio::test]
async fn create_submits_and_returns_the_object() {
    let cluster = FakeCluster::new().serving(SchemaVersion::V1beta1, &["tasks"]);
    let manifest = json!({
        "apiVersion": "tekton.dev/v1beta1",
        "kind": "Task",
        "metadata": {"name": "task"},
        "spec": {"steps": [{"name": "build", "image": "alpine"}]}
    });

    let created = task::create(&cluster, &manifest, "ns").await.unwrap();
    assert_eq!(created["metadata"]["name"], "task");
    assert!(cluster.object("tasks", "ns", "task").is_some());
}

#[tokio::test]
async fn create_requires_a_name() {
    let cluster = FakeCluster::new().serving(SchemaVersion::V1beta1, &["tasks"]);
    let manifest = json!({
        "apiVersion": "tekton.dev/v1beta1",
        "kind": "Task",
        "metadata": {},
        "spec": {}
    });

    let err = task::create(&cluster, &manifest, "ns").await.unwrap_err();
    assert!(matches!(err, Error::InvalidManifest(_)));
}

#[tokio::test]
async fn run_listing_carries_classified_state() {
    let cluster = FakeCluster::new()
        .serving(SchemaVersion::V1beta1, &["taskruns"])
        .with_object(run_document(
            "tekton.dev/v1beta1",
            "TaskRun",
            "tr-running",
            "ns",
            "2024-05-01T10:00:00Z",
            &[("Succeeded", "Unknown", Some("Running"))],
        ))
        .with_object(run_document(
            "tekton.dev/v1beta1",
            "TaskRun",
            "tr-done",
            "ns",
            "2024-05-01T11:00:00Z",
            &[("Succeeded", "True", None)],
        ));

    let runs = taskrun::list(&cluster, "ns").await.unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].name, "tr-running");
    assert_eq!(runs[0].state(), RunState::Running);
    assert_eq!(runs[1].name, "tr-done");
    assert_eq!(runs[1].state(), RunState::Succeeded);
}

#[tokio::test]
async fn v1_only_cluster_uses_the_untyped_path() {
    let cluster = FakeCluster::new()
        .serving(SchemaVersion::V1, &["pipelineruns"])
        .with_object(run_document(
            "tekton.dev/v1",
            "PipelineRun",
            "pr-new",
            "ns",
            "2024-05-01T10:00:00Z",
            &[("Succeeded", "Unknown", None)],
        ));

    let runs = pipelinerun::list(&cluster, "ns").await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].name, "pr-new");

    let run = pipelinerun::get(&cluster, "pr-new", "ns").await.unwrap();
    assert_eq!(run.state(), RunState::Running);
}

#[tokio::test]
async fn newest_served_version_is_used_for_reads() {
    // Same object shape seeded once; the beta listing must be the one hit
    // even though alpha is also advertised.
    let cluster = FakeCluster::new()
        .serving(SchemaVersion::V1alpha1, &["pipelineruns"])
        .serving(SchemaVersion::V1beta1, &["pipelineruns"])
        .with_object(run_document(
            "tekton.dev/v1beta1",
            "PipelineRun",
            "pr",
            "ns",
            "2024-05-01T10:00:00Z",
            &[],
        ));

    let run = pipelinerun::get(&cluster, "pr", "ns").await.unwrap();
    assert_eq!(run.namespace, "ns");
    assert_eq!(run.state(), RunState::Running);
}

#[tokio::test]
async fn canceled_discovery_surfaces_as_canceled() {
    let cluster = FakeCluster::new()
        .serving(SchemaVersion::V1beta1, &["tasks"])
        .canceled_discovery();

    let err = task::list(&cluster, "ns").await.unwrap_err();
    assert!(matches!(err, Error::Canceled));
}

#[tokio::test]
async fn canceled_object_calls_surface_as_canceled() {
    let cluster = FakeCluster::new()
        .serving(SchemaVersion::V1beta1, &["tasks", "taskruns"])
        .with_object(named_document(
            "tekton.dev/v1beta1",
            "Task",
            "task",
            "ns",
            "2024-05-01T10:00:00Z",
        ))
        .canceled_calls();

    let err = taskrun::get(&cluster, "tr", "ns").await.unwrap_err();
    assert!(matches!(err, Error::Canceled), "get: {err}");

    let err = task::list(&cluster, "ns").await.unwrap_err();
    assert!(matches!(err, Error::Canceled), "list: {err}");
}
