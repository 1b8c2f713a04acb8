//! Wire types for the `tekton.dev` custom resources this client speaks.
//!
//! Each schema version the cluster may serve gets its own module with the
//! structs compiled in for that exact revision. Versions newer than the ones
//! here (currently `v1`) have no typed representation and are handled through
//! the untyped document path in the `client` crate.

pub mod condition;
pub mod v1alpha1;
pub mod v1beta1;

pub use condition::{Condition, ConditionStatus};
