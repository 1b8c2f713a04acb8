//! Version-aware resource access layer for the pipeline platform's custom
//! resources.
//!
//! One command invocation flows through a fixed sequence: resolve which
//! schema version the cluster serves ([`version::resolve_version`]), obtain a
//! typed or dynamic handle for it ([`handle::build_client`]), then perform
//! the operation ([`ops`]) or drive the cancellation state machine
//! ([`cancel`]). Everything remote goes through the injected
//! [`transport::ResourceClient`] capability; nothing is cached across
//! invocations and no remote call is retried.

pub mod cancel;
pub mod error;
pub mod handle;
pub mod ops;
pub mod run;
pub mod test_support;
pub mod transport;
pub mod version;

pub use cancel::{cancel, CancelConfirmation, GraceMode};
pub use error::Error;
pub use handle::{build_client, ClientHandle};
pub use run::{RunObject, RunState, TerminalReason};
pub use transport::{ApiTarget, KubeResourceClient, ResourceClient, TransportError};
pub use version::{resolve_version, ResourceKind, SchemaVersion};
