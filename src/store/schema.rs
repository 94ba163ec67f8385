//! Store wire format
//!
//! Endpoint paths and JSON bodies of the store's REST API.

use serde::{Deserialize, Serialize};

use super::{ObjectResult, StoreObject};

/// Readiness endpoint, answers 2xx once the store accepts traffic
pub const READY_SEGMENTS: &[&str] = &["v1", ".well-known", "ready"];

/// Batched object creation
pub const BATCH_OBJECTS_SEGMENTS: &[&str] = &["v1", "batch", "objects"];

/// Path segments for adding a cross-reference to an existing object
pub fn reference_segments<'a>(class: &'a str, id: &'a str, property: &'a str) -> [&'a str; 6] {
    ["v1", "objects", class, id, "references", property]
}

/// Beacon URI the store uses to address an object
pub fn beacon(class: &str, id: &str) -> String {
    format!("weaviate://localhost/{}/{}", class, id)
}

#[derive(Debug, Serialize)]
pub struct BatchObjectsRequest<'a> {
    pub objects: &'a [StoreObject],
}

/// One element of the batch response array
#[derive(Debug, Default, Deserialize)]
pub struct BatchObjectResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub result: Option<ObjectResultBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ObjectResultBody {
    #[serde(default)]
    pub errors: Option<ErrorList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorList {
    #[serde(default)]
    pub error: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl BatchObjectResponse {
    /// Convert to an `ObjectResult`, using `fallback_id` when the store omits the id.
    pub fn into_result(self, fallback_id: &str) -> ObjectResult {
        let id = self.id.unwrap_or_else(|| fallback_id.to_string());
        let errors = self
            .result
            .and_then(|r| r.errors)
            .map(|list| list.error.into_iter().map(|e| e.message).collect())
            .unwrap_or_default();
        ObjectResult { id, errors }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReferencePayload {
    pub beacon: String,
}
