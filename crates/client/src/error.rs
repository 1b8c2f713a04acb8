//! Error taxonomy for the resource access layer.
//!
//! Every variant is a terminal outcome of one command invocation; nothing
//! here triggers a local retry. Callers branch on the variant, the display
//! text is what ends up in front of the user.

use thiserror::Error;

use crate::cancel::GraceMode;
use crate::run::RunState;
use crate::transport::TransportError;
use crate::version::{ResourceKind, SchemaVersion};

/// Outcomes of the access layer that callers must be able to tell apart.
#[derive(Error, Debug)]
pub enum Error {
    /// No supported schema version of the kind is advertised by the cluster.
    #[error("no served schema version found for {kind}: the cluster is incompatible or the resource was removed")]
    NotServed { kind: ResourceKind },

    /// The transport/auth context could not be established.
    #[error("failed to build cluster client")]
    ClientConstruction(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The named object does not exist in the namespace.
    #[error("failed to find {kind}: {name} in namespace {namespace}")]
    NotFound {
        kind: ResourceKind,
        name: String,
        namespace: String,
    },

    /// Cancellation was requested on a run that already reached a terminal
    /// state. A policy decision, not a remote failure: no mutation was sent.
    #[error("failed to cancel {kind} {name}: run {state}")]
    AlreadyFinished {
        kind: ResourceKind,
        name: String,
        state: RunState,
    },

    /// The cancellation patch itself failed. Exactly one attempt was made.
    #[error("failed to cancel {kind} {name}")]
    CancelFailed {
        kind: ResourceKind,
        name: String,
        #[source]
        source: TransportError,
    },

    /// A grace mode was requested against a kind/version without the
    /// graceful-cancellation capability.
    #[error("{mode} is not supported by {kind} {version}")]
    UnsupportedGraceMode {
        mode: GraceMode,
        kind: ResourceKind,
        version: SchemaVersion,
    },

    /// The caller's context or deadline canceled an in-flight call.
    #[error("request canceled before completion")]
    Canceled,

    /// A manifest handed to create is missing a field the remote API
    /// requires up front.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// A document claiming a known version did not match its compiled shape.
    #[error("failed to decode {kind} {version} object")]
    Decode {
        kind: ResourceKind,
        version: SchemaVersion,
        #[source]
        source: serde_json::Error,
    },

    /// Any other remote API failure, passed through.
    #[error(transparent)]
    Transport(TransportError),
}

impl Error {
    /// Map a transport error from a read/create call into the taxonomy,
    /// attaching the object identity callers expect in `NotFound` messages.
    pub(crate) fn from_transport(
        err: TransportError,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Self {
        match err {
            TransportError::NotFound => Self::NotFound {
                kind,
                name: name.to_string(),
                namespace: namespace.to_string(),
            },
            TransportError::Canceled => Self::Canceled,
            other => Self::Transport(other),
        }
    }
}
