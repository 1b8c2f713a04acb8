//! The injected Resource Client capability: discovery plus per-version
//! List/Get/Create/Patch primitives over untyped wire documents.
//!
//! The access layer never talks to the API server directly; everything goes
//! through [`ResourceClient`] so tests can substitute a seeded in-memory
//! cluster. [`KubeResourceClient`] is the production implementation on top of
//! `kube::Client`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use kube::api::{Api, DynamicObject, ListParams, Patch, PatchParams, PostParams};
use kube::config::KubeConfigOptions;
use kube::discovery::ApiResource;
use kube::{Client, Config};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::Error;
use crate::version::{ResourceKind, SchemaVersion};

/// Address of one resource collection: everything the transport needs to
/// route a request, with no client-side schema attached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiTarget {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

impl ApiTarget {
    #[must_use]
    pub fn new(kind: ResourceKind, version: SchemaVersion) -> Self {
        Self {
            group: kind.group().to_string(),
            version: version.as_str().to_string(),
            kind: kind.as_str().to_string(),
            plural: kind.plural().to_string(),
        }
    }

    /// `group/version` wire string.
    #[must_use]
    pub fn group_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }
}

/// Transport-level failures. Deliberately small: the access layer maps these
/// into its own taxonomy at the call sites that know the object identity.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The object (or, for discovery, the whole group/version) is absent.
    #[error("resource not found")]
    NotFound,

    /// The caller's deadline expired or its context was dropped; the call
    /// returned promptly instead of hanging.
    #[error("request canceled by caller deadline")]
    Canceled,

    /// Anything else the remote API reported.
    #[error("api request failed: {0}")]
    Api(String),
}

/// External capability this core consumes: served-version discovery and the
/// four per-version primitives, keyed by (group, version, plural, namespace,
/// name), documents as raw wire JSON.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Plural resource names served under `group_version`, subresources
    /// excluded. `TransportError::NotFound` when the group/version itself is
    /// not served.
    async fn served_resources(&self, group_version: &str) -> Result<Vec<String>, TransportError>;

    async fn list(&self, target: &ApiTarget, namespace: &str)
        -> Result<Vec<Value>, TransportError>;

    async fn get(
        &self,
        target: &ApiTarget,
        namespace: &str,
        name: &str,
    ) -> Result<Value, TransportError>;

    async fn create(
        &self,
        target: &ApiTarget,
        namespace: &str,
        document: &Value,
    ) -> Result<Value, TransportError>;

    /// Merge-patch `body` into the named object. Issued at most once per
    /// invocation by this core; idempotency of duplicates is not assumed.
    async fn patch(
        &self,
        target: &ApiTarget,
        namespace: &str,
        name: &str,
        body: &Value,
    ) -> Result<Value, TransportError>;
}

/// Production transport over `kube::Client`.
///
/// Every remote call runs under `request_timeout` and reports a prompt
/// [`TransportError::Canceled`] when it elapses.
pub struct KubeResourceClient {
    client: Client,
    request_timeout: Duration,
}

impl KubeResourceClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Build from the ambient kubeconfig / in-cluster environment.
    ///
    /// # Errors
    ///
    /// `Error::ClientConstruction` when the kubeconfig or auth context cannot
    /// be established. Not retried here.
    pub async fn try_default(request_timeout: Duration) -> Result<Self, Error> {
        let client = Client::try_default()
            .await
            .map_err(|e| Error::ClientConstruction(Box::new(e)))?;
        Ok(Self {
            client,
            request_timeout,
        })
    }

    /// Build from an explicit kubeconfig context selection.
    ///
    /// # Errors
    ///
    /// `Error::ClientConstruction` on kubeconfig load or client setup failure.
    pub async fn from_kubeconfig(
        options: &KubeConfigOptions,
        request_timeout: Duration,
    ) -> Result<Self, Error> {
        let config = Config::from_kubeconfig(options)
            .await
            .map_err(|e| Error::ClientConstruction(Box::new(e)))?;
        let client =
            Client::try_from(config).map_err(|e| Error::ClientConstruction(Box::new(e)))?;
        Ok(Self {
            client,
            request_timeout,
        })
    }

    fn api_for(&self, target: &ApiTarget, namespace: &str) -> Api<DynamicObject> {
        let resource = ApiResource {
            group: target.group.clone(),
            version: target.version.clone(),
            api_version: target.group_version(),
            kind: target.kind.clone(),
            plural: target.plural.clone(),
        };
        Api::namespaced_with(self.client.clone(), namespace, &resource)
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, TransportError>
    where
        F: Future<Output = Result<T, kube::Error>>,
    {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result.map_err(map_kube_error),
            Err(_) => Err(TransportError::Canceled),
        }
    }
}

fn map_kube_error(err: kube::Error) -> TransportError {
    match err {
        kube::Error::Api(ref response) if response.code == 404 => TransportError::NotFound,
        other => TransportError::Api(other.to_string()),
    }
}

fn to_document(object: &DynamicObject) -> Result<Value, TransportError> {
    serde_json::to_value(object).map_err(|e| TransportError::Api(e.to_string()))
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn served_resources(&self, group_version: &str) -> Result<Vec<String>, TransportError> {
        debug!(group_version, "listing served resources");
        let list = self
            .bounded(self.client.list_api_group_resources(group_version))
            .await?;
        Ok(list
            .resources
            .into_iter()
            // entries like "taskruns/status" are subresources, not kinds
            .filter(|r| !r.name.contains('/'))
            .map(|r| r.name)
            .collect())
    }

    async fn list(
        &self,
        target: &ApiTarget,
        namespace: &str,
    ) -> Result<Vec<Value>, TransportError> {
        let api = self.api_for(target, namespace);
        let objects = self.bounded(api.list(&ListParams::default())).await?;
        objects.items.iter().map(to_document).collect()
    }

    async fn get(
        &self,
        target: &ApiTarget,
        namespace: &str,
        name: &str,
    ) -> Result<Value, TransportError> {
        let api = self.api_for(target, namespace);
        let object = self.bounded(api.get(name)).await?;
        to_document(&object)
    }

    async fn create(
        &self,
        target: &ApiTarget,
        namespace: &str,
        document: &Value,
    ) -> Result<Value, TransportError> {
        let object: DynamicObject = serde_json::from_value(document.clone())
            .map_err(|e| TransportError::Api(e.to_string()))?;
        let api = self.api_for(target, namespace);
        let created = self
            .bounded(api.create(&PostParams::default(), &object))
            .await?;
        to_document(&created)
    }

    async fn patch(
        &self,
        target: &ApiTarget,
        namespace: &str,
        name: &str,
        body: &Value,
    ) -> Result<Value, TransportError> {
        let api = self.api_for(target, namespace);
        let patched = self
            .bounded(api.patch(name, &PatchParams::default(), &Patch::Merge(body)))
            .await?;
        to_document(&patched)
    }
}
