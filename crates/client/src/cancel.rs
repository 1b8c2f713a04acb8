//! Run cancellation: classify the current execution state, then request the
//! platform stop the run if that is still legal.
//!
//! The sequence is strictly resolve → fetch → classify → patch, with the
//! fetch always fresh (the platform advances runs asynchronously) and the
//! patch issued at most once. A duplicate patch against the remote object is
//! not guaranteed idempotent, so no retry happens here; callers that want one
//! must re-run the whole invocation.

use std::fmt;
use std::str::FromStr;

use serde_json::json;
use tracing::{debug, info};

use crate::error::Error;
use crate::handle::build_client;
use crate::run::{RunObject, RunState};
use crate::transport::ResourceClient;
use crate::version::{resolve_version, ResourceKind, SchemaVersion};

/// How the platform should wind the run down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GraceMode {
    /// Unconditional cancellation.
    #[default]
    None,
    /// Let already-started tasks finish, skip the rest.
    StoppedRunFinally,
    /// Cancel running tasks but still execute finally tasks.
    CancelledRunFinally,
}

impl FromStr for GraceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "StoppedRunFinally" => Ok(Self::StoppedRunFinally),
            "CancelledRunFinally" => Ok(Self::CancelledRunFinally),
            other => Err(format!(
                "invalid grace mode {other:?}: expected StoppedRunFinally or CancelledRunFinally"
            )),
        }
    }
}

impl fmt::Display for GraceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("unconditional cancellation"),
            Self::StoppedRunFinally => f.write_str("StoppedRunFinally"),
            Self::CancelledRunFinally => f.write_str("CancelledRunFinally"),
        }
    }
}

/// Successful cancellation outcome.
#[derive(Clone, Debug)]
pub struct CancelConfirmation {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
    pub version: SchemaVersion,
}

impl fmt::Display for CancelConfirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cancelled: {} in namespace {}",
            self.kind, self.name, self.namespace
        )
    }
}

/// Request cancellation of a TaskRun or PipelineRun.
///
/// # Errors
///
/// - `Error::UnsupportedGraceMode` before any remote mutation when the grace
///   mode is incompatible with the resolved kind/version.
/// - `Error::NotFound` when the run does not exist.
/// - `Error::AlreadyFinished` when the run is terminal; nothing was mutated.
/// - `Error::CancelFailed` when the single patch attempt failed remotely.
///
/// # Panics
///
/// Calling this with a kind that is not a run object is a programmer error
/// and aborts.
pub async fn cancel(
    transport: &dyn ResourceClient,
    kind: ResourceKind,
    name: &str,
    namespace: &str,
    grace: GraceMode,
) -> Result<CancelConfirmation, Error> {
    assert!(
        kind.is_run(),
        "cancel is only defined for TaskRun and PipelineRun, got {kind}"
    );

    let version = resolve_version(transport, kind).await?;
    if grace != GraceMode::None
        && !(kind == ResourceKind::PipelineRun && version.supports_graceful_cancel())
    {
        return Err(Error::UnsupportedGraceMode {
            mode: grace,
            kind,
            version,
        });
    }

    let handle = build_client(transport, kind, version);
    // Always classify from a fresh fetch; a snapshot taken earlier in the
    // invocation may already be terminal.
    let document = handle.get_document(namespace, name).await?;
    let run = RunObject::from_document(&document);

    match run.state() {
        RunState::Running => {
            let sentinel = cancel_sentinel(kind, version, grace);
            debug!(kind = %kind, name, namespace, sentinel, "requesting cancellation");
            let body = json!({"spec": {"status": sentinel}});
            handle
                .patch(namespace, name, &body)
                .await
                .map_err(|source| Error::CancelFailed {
                    kind,
                    name: name.to_string(),
                    source,
                })?;
            info!(kind = %kind, name, namespace, "run cancelled");
            Ok(CancelConfirmation {
                kind,
                name: name.to_string(),
                namespace: namespace.to_string(),
                version,
            })
        }
        state => Err(Error::AlreadyFinished {
            kind,
            name: name.to_string(),
            state,
        }),
    }
}

/// The platform-defined `spec.status` sentinel for this kind, version, and
/// grace mode. Grace validity is checked before this is reached.
fn cancel_sentinel(kind: ResourceKind, version: SchemaVersion, grace: GraceMode) -> &'static str {
    match (grace, kind) {
        (GraceMode::StoppedRunFinally, _) => "StoppedRunFinally",
        (GraceMode::CancelledRunFinally, _) => "CancelledRunFinally",
        (GraceMode::None, ResourceKind::TaskRun) => "TaskRunCancelled",
        (GraceMode::None, ResourceKind::PipelineRun) => {
            if version == SchemaVersion::V1alpha1 {
                "PipelineRunCancelled"
            } else {
                "Cancelled"
            }
        }
        (GraceMode::None, other) => unreachable!("{other} is not a run kind"),
    }
}
