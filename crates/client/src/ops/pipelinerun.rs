//! Operations on `PipelineRun` resources.

use serde_json::Value;

use super::{decode_as, encode, ensure_named, sort_listing};
use crate::error::Error;
use crate::handle::{build_client, ClientHandle};
use crate::run::RunObject;
use crate::transport::ResourceClient;
use crate::version::{resolve_version, ResourceKind, SchemaVersion};

const KIND: ResourceKind = ResourceKind::PipelineRun;

/// List pipeline runs in `namespace`, creation-ascending.
///
/// # Errors
///
/// `Error::NotServed` when no supported version is served, plus transport
/// failures.
pub async fn list(
    transport: &dyn ResourceClient,
    namespace: &str,
) -> Result<Vec<RunObject>, Error> {
    let version = resolve_version(transport, KIND).await?;
    let handle = build_client(transport, KIND, version);
    let mut items: Vec<RunObject> = match &handle {
        ClientHandle::Typed(typed) => match version {
            SchemaVersion::V1alpha1 => typed
                .list::<resources::v1alpha1::PipelineRun>(namespace)
                .await?
                .into_iter()
                .map(RunObject::from)
                .collect(),
            SchemaVersion::V1beta1 => typed
                .list::<resources::v1beta1::PipelineRun>(namespace)
                .await?
                .into_iter()
                .map(RunObject::from)
                .collect(),
            SchemaVersion::V1 => unreachable!("v1 has no typed support"),
        },
        ClientHandle::Dynamic(dynamic) => dynamic
            .list(namespace)
            .await?
            .iter()
            .map(RunObject::from_document)
            .collect(),
    };
    sort_listing(&mut items);
    Ok(items)
}

/// Fetch one pipeline run as its version-independent view.
///
/// # Errors
///
/// `Error::NotFound` naming the run when absent.
pub async fn get(
    transport: &dyn ResourceClient,
    name: &str,
    namespace: &str,
) -> Result<RunObject, Error> {
    let version = resolve_version(transport, KIND).await?;
    let handle = build_client(transport, KIND, version);
    match &handle {
        ClientHandle::Typed(typed) => match version {
            SchemaVersion::V1alpha1 => Ok(typed
                .get::<resources::v1alpha1::PipelineRun>(namespace, name)
                .await?
                .into()),
            SchemaVersion::V1beta1 => Ok(typed
                .get::<resources::v1beta1::PipelineRun>(namespace, name)
                .await?
                .into()),
            SchemaVersion::V1 => unreachable!("v1 has no typed support"),
        },
        ClientHandle::Dynamic(dynamic) => Ok(RunObject::from_document(
            &dynamic.get(namespace, name).await?,
        )),
    }
}

/// Fetch one pipeline run as its raw wire document.
///
/// # Errors
///
/// `Error::NotFound` naming the run when absent.
pub async fn get_document(
    transport: &dyn ResourceClient,
    name: &str,
    namespace: &str,
) -> Result<Value, Error> {
    let version = resolve_version(transport, KIND).await?;
    let handle = build_client(transport, KIND, version);
    handle.get_document(namespace, name).await
}

/// Validate-and-submit a pipeline run manifest.
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
                let object: resources::v1alpha1::PipelineRun = decode_as(document, KIND, version)?;
                let created = typed.create(namespace, &object).await?;
                encode(&created, KIND, version)
            }
            SchemaVersion::V1beta1 => {
                let object: resources::v1beta1::PipelineRun = decode_as(document, KIND, version)?;
                let created = typed.create(namespace, &object).await?;
                encode(&created, KIND, version)
            }
            SchemaVersion::V1 => unreachable!("v1 has no typed support"),
        },
        ClientHandle::Dynamic(dynamic) => dynamic.create(namespace, document).await,
    }
}
