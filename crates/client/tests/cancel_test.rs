//! Cancellation state machine behavior against a seeded fake cluster.

use client::test_support::{run_document, FakeCluster};
use client::{cancel, Error, GraceMode, ResourceKind, SchemaVersion};
use serde_json::json;

const CREATED: &str = "2024-05-01T10:00:00Z";

fn beta_cluster() -> FakeCluster {
    FakeCluster::new().serving(SchemaVersion::V1beta1, &["taskruns", "pipelineruns"])
}

#[tokio::test]
async fn running_pipelinerun_gets_exactly_one_patch() {
    let cluster = beta_cluster().with_object(run_document(
        "tekton.dev/v1beta1",
        "PipelineRun",
        "pr-1",
        "ns",
        CREATED,
        &[("Succeeded", "Unknown", Some("Running"))],
    ));

    let confirmation = cancel(
        &cluster,
        ResourceKind::PipelineRun,
        "pr-1",
        "ns",
        GraceMode::None,
    )
    .await
    .unwrap();

    assert_eq!(confirmation.to_string(), "PipelineRun cancelled: pr-1 in namespace ns");
    let patches = cluster.recorded_patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].name, "pr-1");
    assert_eq!(patches[0].body, json!({"spec": {"status": "Cancelled"}}));
}

#[tokio::test]
async fn run_without_conditions_is_cancellable() {
    let cluster = beta_cluster().with_object(run_document(
        "tekton.dev/v1beta1",
        "TaskRun",
        "fresh",
        "ns",
        CREATED,
        &[],
    ));

    cancel(&cluster, ResourceKind::TaskRun, "fresh", "ns", GraceMode::None)
        .await
        .unwrap();

    let patches = cluster.recorded_patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].body, json!({"spec": {"status": "TaskRunCancelled"}}));
}

#[tokio::test]
async fn succeeded_run_is_rejected_without_any_mutation() {
    let cluster = beta_cluster().with_object(run_document(
        "tekton.dev/v1beta1",
        "PipelineRun",
        "done",
        "ns",
        CREATED,
        &[("Succeeded", "True", None)],
    ));

    let err = cancel(
        &cluster,
        ResourceKind::PipelineRun,
        "done",
        "ns",
        GraceMode::None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::AlreadyFinished { .. }));
    assert_eq!(
        err.to_string(),
        "failed to cancel PipelineRun done: run has already succeeded"
    );
    assert!(cluster.recorded_patches().is_empty());
}

#[tokio::test]
async fn every_false_reason_is_terminal() {
    for reason in ["PipelineRunCancelled", "PipelineRunTimeout", "CouldntGetPipeline"] {
        let cluster = beta_cluster().with_object(run_document(
            "tekton.dev/v1beta1",
            "PipelineRun",
            "ended",
            "ns",
            CREATED,
            &[("Succeeded", "False", Some(reason))],
        ));

        let err = cancel(
            &cluster,
            ResourceKind::PipelineRun,
            "ended",
            "ns",
            GraceMode::None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::AlreadyFinished { .. }), "{reason}");
        assert!(cluster.recorded_patches().is_empty(), "{reason}");
    }
}

#[tokio::test]
async fn missing_run_reports_not_found() {
    let cluster = beta_cluster();

    let err = cancel(
        &cluster,
        ResourceKind::PipelineRun,
        "test-pipeline-run-123",
        "invalid",
        GraceMode::None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(
        err.to_string(),
        "failed to find PipelineRun: test-pipeline-run-123 in namespace invalid"
    );
}

#[tokio::test]
async fn grace_mode_requires_the_capability() {
    // Cluster only serves the alpha revision, which predates graceful stop.
    let cluster = FakeCluster::new()
        .serving(SchemaVersion::V1alpha1, &["pipelineruns"])
        .with_object(run_document(
            "tekton.dev/v1alpha1",
            "PipelineRun",
            "pr-1",
            "ns",
            CREATED,
            &[("Succeeded", "Unknown", None)],
        ));

    let err = cancel(
        &cluster,
        ResourceKind::PipelineRun,
        "pr-1",
        "ns",
        GraceMode::StoppedRunFinally,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::UnsupportedGraceMode { .. }));
    assert!(cluster.recorded_patches().is_empty());
}

#[tokio::test]
async fn grace_mode_is_never_valid_for_taskruns() {
    let cluster = beta_cluster().with_object(run_document(
        "tekton.dev/v1beta1",
        "TaskRun",
        "tr-1",
        "ns",
        CREATED,
        &[],
    ));

    let err = cancel(
        &cluster,
        ResourceKind::TaskRun,
        "tr-1",
        "ns",
        GraceMode::CancelledRunFinally,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::UnsupportedGraceMode { .. }));
    assert!(cluster.recorded_patches().is_empty());
}

#[tokio::test]
async fn graceful_sentinel_is_sent_verbatim() {
    let cluster = beta_cluster().with_object(run_document(
        "tekton.dev/v1beta1",
        "PipelineRun",
        "pr-1",
        "ns",
        CREATED,
        &[("Succeeded", "Unknown", None)],
    ));

    cancel(
        &cluster,
        ResourceKind::PipelineRun,
        "pr-1",
        "ns",
        GraceMode::StoppedRunFinally,
    )
    .await
    .unwrap();

    let patches = cluster.recorded_patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].body, json!({"spec": {"status": "StoppedRunFinally"}}));
}

#[tokio::test]
async fn failed_patch_wraps_the_cause_and_is_not_retried() {
    let cluster = beta_cluster()
        .with_object(run_document(
            "tekton.dev/v1beta1",
            "PipelineRun",
            "pr-1",
            "ns",
            CREATED,
            &[("Succeeded", "Unknown", None)],
        ))
        .failing_patches("connection refused");

    let err = cancel(
        &cluster,
        ResourceKind::PipelineRun,
        "pr-1",
        "ns",
        GraceMode::None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::CancelFailed { .. }));
    let cause = std::error::Error::source(&err).unwrap().to_string();
    assert!(cause.contains("connection refused"), "{cause}");
    assert_eq!(cluster.recorded_patches().len(), 1);
}

#[tokio::test]
async fn v1_runs_are_cancelled_through_the_dynamic_path() {
    let cluster = FakeCluster::new()
        .serving(SchemaVersion::V1, &["pipelineruns"])
        .with_object(run_document(
            "tekton.dev/v1",
            "PipelineRun",
            "pr-new",
            "ns",
            CREATED,
            &[("Succeeded", "Unknown", None)],
        ));

    cancel(
        &cluster,
        ResourceKind::PipelineRun,
        "pr-new",
        "ns",
        GraceMode::None,
    )
    .await
    .unwrap();

    let patches = cluster.recorded_patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].body, json!({"spec": {"status": "Cancelled"}}));
}

#[tokio::test]
async fn second_cancel_after_completion_is_a_policy_error() {
    let name = "test-pipeline-run-123";
    let cluster = beta_cluster().with_object(run_document(
        "tekton.dev/v1beta1",
        "PipelineRun",
        name,
        "ns",
        CREATED,
        &[("Ready", "Unknown", None)],
    ));

    let confirmation = cancel(&cluster, ResourceKind::PipelineRun, name, "ns", GraceMode::None)
        .await
        .unwrap();
    assert!(confirmation.to_string().contains(name));
    assert_eq!(cluster.recorded_patches().len(), 1);

    // The platform finishes the run between invocations.
    cluster.insert(&run_document(
        "tekton.dev/v1beta1",
        "PipelineRun",
        name,
        "ns",
        CREATED,
        &[("Succeeded", "True", None)],
    ));

    let err = cancel(&cluster, ResourceKind::PipelineRun, name, "ns", GraceMode::None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyFinished { .. }));
    assert_eq!(cluster.recorded_patches().len(), 1, "no second patch");
}

#[tokio::test]
async fn canceled_fetch_is_not_reported_as_a_cancel_failure() {
    let cluster = beta_cluster()
        .with_object(run_document(
            "tekton.dev/v1beta1",
            "PipelineRun",
            "pr-1",
            "ns",
            CREATED,
            &[("Succeeded", "Unknown", None)],
        ))
        .canceled_calls();

    let err = cancel(
        &cluster,
        ResourceKind::PipelineRun,
        "pr-1",
        "ns",
        GraceMode::None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Canceled));
    assert_eq!(err.to_string(), "request canceled before completion");
    assert!(cluster.recorded_patches().is_empty(), "nothing was sent");
}
