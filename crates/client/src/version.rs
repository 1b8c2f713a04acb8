//! Resource kinds, schema versions, and served-version resolution.

use std::fmt;

use tracing::debug;

use crate::error::Error;
use crate::transport::{ResourceClient, TransportError};

/// The custom resource kinds this client can operate on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Task,
    Pipeline,
    TaskRun,
    PipelineRun,
    PipelineResource,
}

impl ResourceKind {
    /// API group every kind here lives in.
    #[must_use]
    pub const fn group(self) -> &'static str {
        "tekton.dev"
    }

    /// Plural resource name as advertised by API discovery.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Task => "tasks",
            Self::Pipeline => "pipelines",
            Self::TaskRun => "taskruns",
            Self::PipelineRun => "pipelineruns",
            Self::PipelineResource => "pipelineresources",
        }
    }

    /// Wire kind string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Pipeline => "Pipeline",
            Self::TaskRun => "TaskRun",
            Self::PipelineRun => "PipelineRun",
            Self::PipelineResource => "PipelineResource",
        }
    }

    /// Schema versions this kind may be served at, oldest first.
    ///
    /// `PipelineResource` never graduated past alpha; everything else exists
    /// at all three revisions.
    #[must_use]
    pub const fn supported_versions(self) -> &'static [SchemaVersion] {
        match self {
            Self::PipelineResource => &[SchemaVersion::V1alpha1],
            _ => &[
                SchemaVersion::V1alpha1,
                SchemaVersion::V1beta1,
                SchemaVersion::V1,
            ],
        }
    }

    /// Version at which the kind first appeared.
    #[must_use]
    pub const fn introduced_in(self) -> SchemaVersion {
        SchemaVersion::V1alpha1
    }

    /// Whether the kind is a long-running execution object.
    #[must_use]
    pub const fn is_run(self) -> bool {
        matches!(self, Self::TaskRun | Self::PipelineRun)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One revision of a kind's wire representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaVersion {
    V1alpha1,
    V1beta1,
    V1,
}

impl SchemaVersion {
    /// Version segment of the group/version wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1alpha1 => "v1alpha1",
            Self::V1beta1 => "v1beta1",
            Self::V1 => "v1",
        }
    }

    /// Full `group/version` string for discovery and API paths.
    #[must_use]
    pub fn group_version(self, kind: ResourceKind) -> String {
        format!("{}/{}", kind.group(), self.as_str())
    }

    /// Capability flag: whether `PipelineRun.spec.status` accepts the
    /// graceful sentinels at this revision.
    #[must_use]
    pub const fn supports_graceful_cancel(self) -> bool {
        matches!(self, Self::V1beta1 | Self::V1)
    }

    /// Whether this client carries compiled-in structs for the kind at this
    /// revision. `v1` postdates the compiled schemas and is always handled
    /// through the untyped document path.
    #[must_use]
    pub const fn has_typed_support(self, kind: ResourceKind) -> bool {
        match self {
            Self::V1alpha1 => true,
            Self::V1beta1 => !matches!(kind, ResourceKind::PipelineResource),
            Self::V1 => false,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Determine which schema version of `kind` the connected cluster serves.
///
/// Walks the kind's supported versions newest to oldest and returns the first
/// whose group/version advertises the kind's plural resource name. One
/// discovery round-trip per candidate, no caching: a cluster upgrade between
/// invocations must be picked up on the next run.
///
/// # Errors
///
/// `Error::NotServed` when no supported version is advertised;
/// `Error::Canceled` or `Error::Transport` when discovery itself fails.
pub async fn resolve_version(
    transport: &dyn ResourceClient,
    kind: ResourceKind,
) -> Result<SchemaVersion, Error> {
    for &version in kind.supported_versions().iter().rev() {
        let group_version = version.group_version(kind);
        match transport.served_resources(&group_version).await {
            Ok(names) => {
                if names.iter().any(|n| n == kind.plural()) {
                    debug!(kind = %kind, version = %version, "resolved served schema version");
                    return Ok(version);
                }
            }
            // The whole group/version may be absent on older clusters; keep
            // walking toward the versions they do know about.
            Err(TransportError::NotFound) => {}
            Err(TransportError::Canceled) => return Err(Error::Canceled),
            Err(other) => return Err(Error::Transport(other)),
        }
    }
    Err(Error::NotServed { kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeCluster;

    #[tokio::test]
    async fn resolves_each_version_when_it_is_the_only_one_served() {
        for version in [
            SchemaVersion::V1alpha1,
            SchemaVersion::V1beta1,
            SchemaVersion::V1,
        ] {
            let cluster = FakeCluster::new().serving(version, &["taskruns"]);
            let got = resolve_version(&cluster, ResourceKind::TaskRun)
                .await
                .unwrap();
            assert_eq!(got, version);
        }
    }

    #[tokio::test]
    async fn newest_served_version_wins() {
        let cluster = FakeCluster::new()
            .serving(SchemaVersion::V1alpha1, &["pipelineruns"])
            .serving(SchemaVersion::V1beta1, &["pipelineruns"]);
        let got = resolve_version(&cluster, ResourceKind::PipelineRun)
            .await
            .unwrap();
        assert_eq!(got, SchemaVersion::V1beta1);
    }

    #[tokio::test]
    async fn advertised_group_without_the_plural_does_not_match() {
        let cluster = FakeCluster::new()
            .serving(SchemaVersion::V1beta1, &["tasks"])
            .serving(SchemaVersion::V1alpha1, &["tasks", "taskruns"]);
        let got = resolve_version(&cluster, ResourceKind::TaskRun)
            .await
            .unwrap();
        assert_eq!(got, SchemaVersion::V1alpha1);
    }

    #[tokio::test]
    async fn unserved_kind_fails_with_not_served() {
        let cluster = FakeCluster::new().serving(SchemaVersion::V1beta1, &["tasks"]);
        let err = resolve_version(&cluster, ResourceKind::PipelineResource)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotServed {
                kind: ResourceKind::PipelineResource
            }
        ));
    }

    #[tokio::test]
    async fn empty_cluster_fails_with_not_served() {
        let cluster = FakeCluster::new();
        let err = resolve_version(&cluster, ResourceKind::Task)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotServed { .. }));
    }
}
