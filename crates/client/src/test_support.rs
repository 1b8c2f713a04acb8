//! In-memory stand-in for the Resource Client capability.
//!
//! Seeded with wire documents and a table of advertised group/versions, it
//! records every mutation so tests can assert on exactly what was sent.
//! Fixture code: unwraps freely.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::transport::{ApiTarget, ResourceClient, TransportError};
use crate::version::SchemaVersion;

type Key = (String, String, String); // (plural, namespace, name)

/// One recorded mutation call.
#[derive(Clone, Debug)]
pub struct RecordedPatch {
    pub plural: String,
    pub namespace: String,
    pub name: String,
    pub body: Value,
}

/// Pre-seeded fake cluster implementing [`ResourceClient`].
#[derive(Default)]
pub struct FakeCluster {
    served: HashMap<String, Vec<String>>,
    objects: Mutex<HashMap<Key, Value>>,
    patches: Mutex<Vec<RecordedPatch>>,
    patch_failure: Mutex<Option<String>>,
    canceled_calls: bool,
    canceled_discovery: bool,
}

impl FakeCluster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise `plurals` under `tekton.dev/<version>`.
    #[must_use]
    pub fn serving(mut self, version: SchemaVersion, plurals: &[&str]) -> Self {
        self.served
            .entry(format!("tekton.dev/{}", version.as_str()))
            .or_default()
            .extend(plurals.iter().map(ToString::to_string));
        self
    }

    /// Seed one object; its collection is derived from the document's kind.
    #[must_use]
    pub fn with_object(self, document: Value) -> Self {
        self.insert(&document);
        self
    }

    /// Seed or replace an object after construction (e.g. to simulate the
    /// platform transitioning a run between invocations).
    pub fn insert(&self, document: &Value) {
        let key = key_of(document);
        self.objects
            .lock()
            .unwrap()
            .insert(key, document.clone());
    }

    /// Make every subsequent patch fail with a transport error carrying
    /// `message`. Attempts are still recorded.
    #[must_use]
    pub fn failing_patches(self, message: &str) -> Self {
        *self.patch_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Make every object call (list/get/create/patch) fail as if the
    /// per-request deadline expired before an answer arrived. Nothing is
    /// recorded for such calls.
    #[must_use]
    pub fn canceled_calls(mut self) -> Self {
        self.canceled_calls = true;
        self
    }

    /// Make discovery itself fail as if the deadline expired.
    #[must_use]
    pub fn canceled_discovery(mut self) -> Self {
        self.canceled_discovery = true;
        self
    }

    #[must_use]
    pub fn recorded_patches(&self) -> Vec<RecordedPatch> {
        self.patches.lock().unwrap().clone()
    }

    /// Current stored state of an object, if any.
    #[must_use]
    pub fn object(&self, plural: &str, namespace: &str, name: &str) -> Option<Value> {
        self.objects
            .lock()
            .unwrap()
            .get(&(plural.to_string(), namespace.to_string(), name.to_string()))
            .cloned()
    }
}

fn key_of(document: &Value) -> Key {
    let kind = document["kind"].as_str().expect("document must carry kind");
    let plural = format!("{}s", kind.to_lowercase());
    let meta = &document["metadata"];
    (
        plural,
        meta["namespace"].as_str().unwrap_or_default().to_string(),
        meta["name"].as_str().expect("document must be named").to_string(),
    )
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target_map), Some(patch_map)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else if target_map.get(key).is_some_and(Value::is_object) && value.is_object() {
                merge(target_map.get_mut(key).unwrap(), value);
            } else {
                target_map.insert(key.clone(), value.clone());
            }
        }
    } else {
        *target = patch.clone();
    }
}

#[async_trait]
impl ResourceClient for FakeCluster {
    async fn served_resources(&self, group_version: &str) -> Result<Vec<String>, TransportError> {
        if self.canceled_discovery {
            return Err(TransportError::Canceled);
        }
        self.served
            .get(group_version)
            .cloned()
            .ok_or(TransportError::NotFound)
    }

    async fn list(
        &self,
        target: &ApiTarget,
        namespace: &str,
    ) -> Result<Vec<Value>, TransportError> {
        if self.canceled_calls {
            return Err(TransportError::Canceled);
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|((plural, ns, _), _)| plural == &target.plural && ns == namespace)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn get(
        &self,
        target: &ApiTarget,
        namespace: &str,
        name: &str,
    ) -> Result<Value, TransportError> {
        if self.canceled_calls {
            return Err(TransportError::Canceled);
        }
        self.object(&target.plural, namespace, name)
            .ok_or(TransportError::NotFound)
    }

    async fn create(
        &self,
        target: &ApiTarget,
        namespace: &str,
        document: &Value,
    ) -> Result<Value, TransportError> {
        if self.canceled_calls {
            return Err(TransportError::Canceled);
        }
        let name = document["metadata"]["name"]
            .as_str()
            .ok_or_else(|| TransportError::Api("metadata.name is required".to_string()))?;
        let mut stored = document.clone();
        stored["metadata"]["namespace"] = json!(namespace);
        self.objects.lock().unwrap().insert(
            (
                target.plural.clone(),
                namespace.to_string(),
                name.to_string(),
            ),
            stored.clone(),
        );
        Ok(stored)
    }

    async fn patch(
        &self,
        target: &ApiTarget,
        namespace: &str,
        name: &str,
        body: &Value,
    ) -> Result<Value, TransportError> {
        if self.canceled_calls {
            return Err(TransportError::Canceled);
        }
        self.patches.lock().unwrap().push(RecordedPatch {
            plural: target.plural.clone(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            body: body.clone(),
        });
        if let Some(message) = self.patch_failure.lock().unwrap().clone() {
            return Err(TransportError::Api(message));
        }
        let mut objects = self.objects.lock().unwrap();
        let key = (
            target.plural.clone(),
            namespace.to_string(),
            name.to_string(),
        );
        let document = objects.get_mut(&key).ok_or(TransportError::NotFound)?;
        merge(document, body);
        Ok(document.clone())
    }
}

/// Wire document for a run object with the given conditions, each
/// `(type, status, reason)`.
#[must_use]
pub fn run_document(
    api_version: &str,
    kind: &str,
    name: &str,
    namespace: &str,
    created: &str,
    conditions: &[(&str, &str, Option<&str>)],
) -> Value {
    let conditions: Vec<Value> = conditions
        .iter()
        .map(|(condition_type, status, reason)| {
            let mut c = json!({"type": condition_type, "status": status});
            if let Some(reason) = reason {
                c["reason"] = json!(reason);
            }
            c
        })
        .collect();
    json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": {
            "name": name,
            "namespace": namespace,
            "creationTimestamp": created
        },
        "spec": {},
        "status": {"conditions": conditions}
    })
}

/// Minimal named document for non-run kinds.
#[must_use]
pub fn named_document(
    api_version: &str,
    kind: &str,
    name: &str,
    namespace: &str,
    created: &str,
) -> Value {
    json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": {
            "name": name,
            "namespace": namespace,
            "creationTimestamp": created
        },
        "spec": {}
    })
}
