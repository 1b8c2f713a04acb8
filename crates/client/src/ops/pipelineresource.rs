//! Operations on `PipelineResource` resources (alpha-only kind).

use serde_json::Value;

use super::{decode_as, encode, ensure_named, sort_listing, ResourceSummary};
use crate::error::Error;
use crate::handle::{build_client, ClientHandle};
use crate::transport::ResourceClient;
use crate::version::{resolve_version, ResourceKind, SchemaVersion};

const KIND: ResourceKind = ResourceKind::PipelineResource;

/// List pipeline resources in `namespace`, creation-ascending.
///
/// # Errors
///
/// `Error::NotServed` on clusters that dropped the alpha API, plus transport
/// failures.
pub async fn list(
    transport: &dyn ResourceClient,
    namespace: &str,
) -> Result<Vec<ResourceSummary>, Error> {
    let version = resolve_version(transport, KIND).await?;
    let handle = build_client(transport, KIND, version);
    let mut items: Vec<ResourceSummary> = match &handle {
        ClientHandle::Typed(typed) => typed
            .list::<resources::v1alpha1::PipelineResource>(namespace)
            .await?
            .into_iter()
            .map(|r| ResourceSummary::from_meta(r.metadata))
            .collect(),
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

/// Fetch one pipeline resource as its wire document.
///
/// # Errors
///
/// `Error::NotFound` naming the resource when absent.
pub async fn get(
    transport: &dyn ResourceClient,
    name: &str,
    namespace: &str,
) -> Result<Value, Error> {
    let version = resolve_version(transport, KIND).await?;
    let handle = build_client(transport, KIND, version);
    handle.get_document(namespace, name).await
}

/// Validate-and-submit a pipeline resource manifest.
///
/// # Errors
///
/// `Error::InvalidManifest` when the name is missing, `Error::Decode` on a
/// shape mismatch, plus transport failures.
pub async fn create(
    transport: &dyn ResourceClient,
    document: &Value,
    namespace: &str,
) -> Result<Value, Error> {
    ensure_named(document)?;
    let version = resolve_version(transport, KIND).await?;
    let handle = build_client(transport, KIND, version);
    match &handle {
        ClientHandle::Typed(typed) => {
            debug_assert_eq!(version, SchemaVersion::V1alpha1);
            let object: resources::v1alpha1::PipelineResource = decode_as(document, KIND, version)?;
            let created = typed.create(namespace, &object).await?;
            encode(&created, KIND, version)
        }
        ClientHandle::Dynamic(dynamic) => dynamic.create(namespace, document).await,
    }
}
