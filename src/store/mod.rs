//! Store Layer - schema-less object store access
//!
//! The backing store holds every node under a single class (`ASTNode`):
//! - objects(class, id, properties) keyed by the node id
//! - cross-references stored as object properties named by relationship label
//!
//! `ObjectStore` is the seam the ingestion orchestrator is written against.
//! `HttpStore` implements it over the store's REST API.

pub mod http;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Object class every AST node is stored under
pub const AST_NODE_CLASS: &str = "ASTNode";

/// Fixed property record of a stored AST node.
///
/// The store itself is schema-less; this is the shape we always write.
/// Annotation payloads travel as one opaque text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNodeProperties {
    pub node_type: String,
    pub start_byte: i32,
    pub end_byte: i32,
    pub start_line: i32,
    pub end_line: i32,
    pub source_code_snippet: String,
    pub file_path: String,
    pub git_commit_hash: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<String>,
}

/// A store-native object: class tag, primary id and properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreObject {
    pub class: String,
    pub id: String,
    pub properties: AstNodeProperties,
}

/// Outcome of one object inside a batch write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectResult {
    pub id: String,
    /// Store-side error messages; empty when the object was accepted
    pub errors: Vec<String>,
}

impl ObjectResult {
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            errors: Vec::new(),
        }
    }

    pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            errors: vec![message.into()],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Per-object results of a batch write, in submission order.
///
/// The batch endpoint is not all-or-nothing: callers must inspect this.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    pub results: Vec<ObjectResult>,
}

impl BatchResult {
    pub fn new(results: Vec<ObjectResult>) -> Self {
        Self { results }
    }

    /// First object the store refused, if any
    pub fn first_error(&self) -> Option<&ObjectResult> {
        self.results.iter().find(|r| !r.is_ok())
    }
}

/// Write primitives the ingestion path needs from a store.
///
/// Implementations surface failures as-is; retrying is the caller's call.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Submit all objects as one batched write.
    async fn batch_write_objects(&self, objects: &[StoreObject]) -> Result<BatchResult>;

    /// Create one directed cross-reference from an `ASTNode` object to another object.
    async fn create_reference(
        &self,
        source_id: &str,
        reference_property: &str,
        target_class: &str,
        target_id: &str,
    ) -> Result<()>;
}
