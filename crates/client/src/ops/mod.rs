//! Kind-specific resource operations: list, get, create.
//!
//! Each module resolves the served schema version, asks the factory for a
//! handle, and performs the operation with version-appropriate accessors.
//! Listing order is fixed: creation timestamp ascending, ties broken by name,
//! so output is reproducible across invocations.

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::Value;

use crate::error::Error;
use crate::run::RunObject;

pub mod pipeline;
pub mod pipelineresource;
pub mod pipelinerun;
pub mod task;
pub mod taskrun;

/// Version-independent listing entry for non-run kinds.
#[derive(Clone, Debug)]
pub struct ResourceSummary {
    pub name: String,
    pub namespace: String,
    pub created: Option<DateTime<Utc>>,
}

impl ResourceSummary {
    pub(crate) fn from_meta(meta: ObjectMeta) -> Self {
        Self {
            name: meta.name.unwrap_or_default(),
            namespace: meta.namespace.unwrap_or_default(),
            created: meta.creation_timestamp.map(|t| t.0),
        }
    }

    pub(crate) fn from_document(document: &Value) -> Self {
        let meta = &document["metadata"];
        Self {
            name: meta["name"].as_str().unwrap_or_default().to_string(),
            namespace: meta["namespace"].as_str().unwrap_or_default().to_string(),
            created: meta["creationTimestamp"]
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc)),
        }
    }
}

pub(crate) trait Listed {
    fn created(&self) -> Option<DateTime<Utc>>;
    fn name(&self) -> &str;
}

impl Listed for ResourceSummary {
    fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Listed for RunObject {
    fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }
    fn name(&self) -> &str {
        &self.name
    }
}

/// Creation ascending, name lexicographic tiebreak. Objects without a
/// creation timestamp sort first.
pub(crate) fn sort_listing<T: Listed>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.created()
            .cmp(&b.created())
            .then_with(|| a.name().cmp(b.name()))
    });
}

pub(crate) fn decode_as<T: serde::de::DeserializeOwned>(
    document: &Value,
    kind: crate::version::ResourceKind,
    version: crate::version::SchemaVersion,
) -> Result<T, Error> {
    serde_json::from_value(document.clone()).map_err(|source| Error::Decode {
        kind,
        version,
        source,
    })
}

pub(crate) fn encode<T: serde::Serialize>(
    object: &T,
    kind: crate::version::ResourceKind,
    version: crate::version::SchemaVersion,
) -> Result<Value, Error> {
    serde_json::to_value(object).map_err(|source| Error::Decode {
        kind,
        version,
        source,
    })
}

/// The one client-side admission check: the remote API requires a name.
pub(crate) fn ensure_named(document: &Value) -> Result<(), Error> {
    match document["metadata"]["name"].as_str() {
        Some(name) if !name.is_empty() => Ok(()),
        _ => Err(Error::InvalidManifest(
            "metadata.name is required".to_string(),
        )),
    }
}
