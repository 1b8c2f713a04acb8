//! Client Factory: per-invocation handles bound to one (kind, version) pair.
//!
//! A handle is either typed (the wire shape is compiled in for that exact
//! revision and accessors deserialize into it) or dynamic (the shape is only
//! partially known and accessors hand back the raw document). Both expose the
//! same List/Get/Create/Patch capability; operations that only need
//! name/namespace/conditions work unmodified against either.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::transport::{ApiTarget, ResourceClient, TransportError};
use crate::version::{ResourceKind, SchemaVersion};

/// Build a client handle for `kind` at the resolved `version`.
///
/// Handles are cheap, owned by the requesting invocation, and never cached
/// across version resolutions.
#[must_use]
pub fn build_client(
    transport: &dyn ResourceClient,
    kind: ResourceKind,
    version: SchemaVersion,
) -> ClientHandle<'_> {
    let core = Core {
        transport,
        target: ApiTarget::new(kind, version),
        kind,
        version,
    };
    if version.has_typed_support(kind) {
        ClientHandle::Typed(TypedClient { core })
    } else {
        ClientHandle::Dynamic(DynamicClient { core })
    }
}

/// Capability handle bound to exactly one (kind, version).
pub enum ClientHandle<'a> {
    Typed(TypedClient<'a>),
    Dynamic(DynamicClient<'a>),
}

impl<'a> ClientHandle<'a> {
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.core().kind
    }

    #[must_use]
    pub fn version(&self) -> SchemaVersion {
        self.core().version
    }

    #[must_use]
    pub fn is_typed(&self) -> bool {
        matches!(self, Self::Typed(_))
    }

    fn core(&self) -> &Core<'a> {
        match self {
            Self::Typed(c) => &c.core,
            Self::Dynamic(c) => &c.core,
        }
    }

    /// List raw documents in `namespace`, whatever the variant.
    ///
    /// # Errors
    ///
    /// Transport failures, mapped into the access-layer taxonomy.
    pub async fn list_documents(&self, namespace: &str) -> Result<Vec<Value>, Error> {
        self.core().list_documents(namespace).await
    }

    /// Fetch one raw document.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` with the object identity when absent.
    pub async fn get_document(&self, namespace: &str, name: &str) -> Result<Value, Error> {
        self.core().get_document(namespace, name).await
    }

    /// Submit a raw document for creation.
    ///
    /// # Errors
    ///
    /// Transport failures, mapped into the access-layer taxonomy.
    pub async fn create_document(&self, namespace: &str, document: &Value) -> Result<Value, Error> {
        self.core().create_document(namespace, document).await
    }

    /// Merge-patch the named object. Errors stay at the transport level so
    /// the cancellation state machine can wrap them with its own context.
    pub async fn patch(
        &self,
        namespace: &str,
        name: &str,
        body: &Value,
    ) -> Result<Value, TransportError> {
        self.core()
            .transport
            .patch(&self.core().target, namespace, name, body)
            .await
    }
}

struct Core<'a> {
    transport: &'a dyn ResourceClient,
    target: ApiTarget,
    kind: ResourceKind,
    version: SchemaVersion,
}

impl Core<'_> {
    async fn list_documents(&self, namespace: &str) -> Result<Vec<Value>, Error> {
        self.transport
            .list(&self.target, namespace)
            .await
            .map_err(|e| match e {
                TransportError::Canceled => Error::Canceled,
                other => Error::Transport(other),
            })
    }

    async fn get_document(&self, namespace: &str, name: &str) -> Result<Value, Error> {
        self.transport
            .get(&self.target, namespace, name)
            .await
            .map_err(|e| Error::from_transport(e, self.kind, name, namespace))
    }

    async fn create_document(&self, namespace: &str, document: &Value) -> Result<Value, Error> {
        self.transport
            .create(&self.target, namespace, document)
            .await
            .map_err(|e| match e {
                TransportError::Canceled => Error::Canceled,
                other => Error::Transport(other),
            })
    }

    fn decode<T: DeserializeOwned>(&self, document: Value) -> Result<T, Error> {
        serde_json::from_value(document).map_err(|source| Error::Decode {
            kind: self.kind,
            version: self.version,
            source,
        })
    }
}

/// Handle backed by compiled-in structs for a known, stable revision.
pub struct TypedClient<'a> {
    core: Core<'a>,
}

impl TypedClient<'_> {
    /// List and deserialize into the compiled type for this version.
    ///
    /// # Errors
    ///
    /// `Error::Decode` when a document does not match the compiled shape.
    pub async fn list<T: DeserializeOwned>(&self, namespace: &str) -> Result<Vec<T>, Error> {
        let documents = self.core.list_documents(namespace).await?;
        documents
            .into_iter()
            .map(|doc| self.core.decode(doc))
            .collect()
    }

    /// Fetch one object as the compiled type.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when absent, `Error::Decode` on shape mismatch.
    pub async fn get<T: DeserializeOwned>(&self, namespace: &str, name: &str) -> Result<T, Error> {
        let document = self.core.get_document(namespace, name).await?;
        self.core.decode(document)
    }

    /// Round-trip an object through its compiled shape and submit it.
    ///
    /// # Errors
    ///
    /// Transport failures; `Error::Decode` if the response does not parse.
    pub async fn create<T: Serialize + DeserializeOwned>(
        &self,
        namespace: &str,
        object: &T,
    ) -> Result<T, Error> {
        let document = serde_json::to_value(object).map_err(|source| Error::Decode {
            kind: self.core.kind,
            version: self.core.version,
            source,
        })?;
        let created = self.core.create_document(namespace, &document).await?;
        self.core.decode(created)
    }
}

/// Handle over the schema-agnostic document representation, used for
/// revisions this client has no compiled structs for. Callers own their
/// field-presence checks.
pub struct DynamicClient<'a> {
    core: Core<'a>,
}

impl DynamicClient<'_> {
    /// # Errors
    ///
    /// Transport failures, mapped into the access-layer taxonomy.
    pub async fn list(&self, namespace: &str) -> Result<Vec<Value>, Error> {
        self.core.list_documents(namespace).await
    }

    /// # Errors
    ///
    /// `Error::NotFound` with the object identity when absent.
    pub async fn get(&self, namespace: &str, name: &str) -> Result<Value, Error> {
        self.core.get_document(namespace, name).await
    }

    /// # Errors
    ///
    /// Transport failures, mapped into the access-layer taxonomy.
    pub async fn create(&self, namespace: &str, document: &Value) -> Result<Value, Error> {
        self.core.create_document(namespace, document).await
    }
}
