//! Operations on `Task` resources.

use serde_json::Value;

use super::{decode_as, encode, ensure_named, sort_listing, ResourceSummary};
use crate::error::Error;
use crate::handle::{build_client, ClientHandle};
use crate::transport::ResourceClient;
use crate::version::{resolve_version, ResourceKind, SchemaVersion};

const KIND: ResourceKind = ResourceKind::Task;

/// List tasks in `namespace`, creation-ascending. A namespace with no tasks
/// yields an empty list, not an error.
///
/// # Errors
///
/// `Error::NotServed` when the cluster serves no supported version, plus
/// transport failures.
pub async fn list(
    transport: &dyn ResourceClient,
    namespace: &str,
) -> Result<Vec<ResourceSummary>, Error> {
    let version = resolve_version(transport, KIND).await?;
    let handle = build_client(transport, KIND, version);
    let mut items: Vec<ResourceSummary> = match &handle {
        ClientHandle::Typed(typed) => match version {
            SchemaVersion::V1alpha1 => typed
                .list::<resources::v1alpha1::Task>(namespace)
                .await?
                .into_iter()
                .map(|t| ResourceSummary::from_meta(t.metadata))
                .collect(),
            SchemaVersion::V1beta1 => typed
                .list::<resources::v1beta1::Task>(namespace)
                .await?
                .into_iter()
                .map(|t| ResourceSummary::from_meta(t.metadata))
                .collect(),
            SchemaVersion::V1 => unreachable!("v1 has no typed support"),
        },
        ClientHandle::Dynamic(dynamic) => dynamic
            .list(namespace)
            .await?
            .iter()
            .map(ResourceSummary::from_document)
            .collect(),
    };
    sort_listing(&mut items);
    Ok(items)
}

/// All task names in `namespace`, in listing order.
///
/// # Errors
///
/// Same failure modes as [`list`].
pub async fn list_names(
    transport: &dyn ResourceClient,
    namespace: &str,
) -> Result<Vec<String>, Error> {
    Ok(list(transport, namespace)
        .await?
        .into_iter()
        .map(|summary| summary.name)
        .collect())
}

/// Fetch one task as its wire document.
///
/// # Errors
///
/// `Error::NotFound` naming the task when absent.
pub async fn get(
    transport: &dyn ResourceClient,
    name: &str,
    namespace: &str,
) -> Result<Value, Error> {
    let version = resolve_version(transport, KIND).await?;
    let handle = build_client(transport, KIND, version);
    handle.get_document(namespace, name).await
}

/// Validate-and-submit: shape-check against the compiled structs where the
/// version has them, then hand the manifest to the remote API. Semantic
/// validation stays server-side.
///
/// # Errors
///
/// `Error::InvalidManifest` when the name is missing, `Error::Decode` on a
/// shape mismatch for typed versions, plus transport failures.
pub async fn create(
    transport: &dyn ResourceClient,
    document: &Value,
    namespace: &str,
) -> Result<Value, Error> {
    ensure_named(document)?;
    let version = resolve_version(transport, KIND).await?;
    let handle = build_client(transport, KIND, version);
    match &handle {
        ClientHandle::Typed(typed) => match version {
            SchemaVersion::V1alpha1 => {
                let object: resources::v1alpha1::Task = decode_as(document, KIND, version)?;
                let created = typed.create(namespace, &object).await?;
                encode(&created, KIND, version)
            }
            SchemaVersion::V1beta1 => {
                let object: resources::v1beta1::Task = decode_as(document, KIND, version)?;
                let created = typed.create(namespace, &object).await?;
                encode(&created, KIND, version)
            }
            SchemaVersion::V1 => unreachable!("v1 has no typed support"),
        },
        ClientHandle::Dynamic(dynamic) => dynamic.create(namespace, document).await,
    }
}
