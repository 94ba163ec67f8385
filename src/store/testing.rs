//! Test doubles for the store layer

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use super::schema::ReferencePayload;
use super::{BatchResult, ObjectResult, ObjectStore, StoreObject};
use crate::{Error, Result};

// ========== In-process HTTP store ==========

#[derive(Debug, Clone)]
pub(crate) struct FakeStoreOptions {
    ready_after: u32,
    failing_object: Option<String>,
    reject_batches: bool,
}

impl Default for FakeStoreOptions {
    fn default() -> Self {
        Self {
            ready_after: 1,
            failing_object: None,
            reject_batches: false,
        }
    }
}

impl FakeStoreOptions {
    /// Readiness succeeds from the n-th poll on
    pub fn ready_after(polls: u32) -> Self {
        Self {
            ready_after: polls,
            ..Self::default()
        }
    }

    pub fn never_ready() -> Self {
        Self::ready_after(u32::MAX)
    }

    /// Objects with this id are refused in batches and as reference sources
    pub fn failing_object(mut self, id: &str) -> Self {
        self.failing_object = Some(id.to_string());
        self
    }

    pub fn rejecting_batches(mut self) -> Self {
        self.reject_batches = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakeReference {
    pub class: String,
    pub source_id: String,
    pub property: String,
    pub beacon: String,
}

pub(crate) struct FakeStore {
    options: FakeStoreOptions,
    ready_polls: AtomicU32,
    batches: Mutex<Vec<Value>>,
    references: Mutex<Vec<FakeReference>>,
}

impl FakeStore {
    pub fn ready_polls(&self) -> u32 {
        self.ready_polls.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> Vec<Value> {
        self.batches.lock().unwrap().clone()
    }

    pub fn references(&self) -> Vec<FakeReference> {
        self.references.lock().unwrap().clone()
    }
}

async fn fake_ready(State(store): State<Arc<FakeStore>>) -> StatusCode {
    let polls = store.ready_polls.fetch_add(1, Ordering::SeqCst) + 1;
    if polls >= store.options.ready_after {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn fake_batch(State(store): State<Arc<FakeStore>>, Json(body): Json<Value>) -> Response {
    store.batches.lock().unwrap().push(body.clone());

    if store.options.reject_batches {
        return (StatusCode::INTERNAL_SERVER_ERROR, "store unavailable").into_response();
    }

    let objects = body["objects"].as_array().cloned().unwrap_or_default();
    let results: Vec<Value> = objects
        .iter()
        .map(|object| {
            let id = object["id"].as_str().unwrap_or_default();
            if store.options.failing_object.as_deref() == Some(id) {
                let errors = json!({ "error": [{ "message": "invalid object" }] });
                json!({ "id": id, "result": { "errors": errors } })
            } else {
                json!({ "id": id, "result": {} })
            }
        })
        .collect();

    Json(results).into_response()
}

async fn fake_reference(
    State(store): State<Arc<FakeStore>>,
    Path((class, source_id, property)): Path<(String, String, String)>,
    Json(payload): Json<ReferencePayload>,
) -> Response {
    let rejected = store.options.failing_object.as_deref() == Some(source_id.as_str());
    store.references.lock().unwrap().push(FakeReference {
        class,
        source_id,
        property,
        beacon: payload.beacon,
    });

    if rejected {
        let body = json!({ "error": [{ "message": "source object not found" }] });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    }
    StatusCode::OK.into_response()
}

/// Serve a fake store on an ephemeral port. Returns its base URL.
pub(crate) async fn spawn_fake_store(options: FakeStoreOptions) -> (String, Arc<FakeStore>) {
    let store = Arc::new(FakeStore {
        options,
        ready_polls: AtomicU32::new(0),
        batches: Mutex::new(Vec::new()),
        references: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/v1/.well-known/ready", get(fake_ready))
        .route("/v1/batch/objects", post(fake_batch))
        .route("/v1/objects/{class}/{id}/references/{property}", post(fake_reference))
        .with_state(store.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), store)
}

// ========== Recording in-memory store ==========

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedReference {
    pub source_id: String,
    pub property: String,
    pub target_class: String,
    pub target_id: String,
}

/// Records every call and fails where scripted to.
#[derive(Default)]
pub(crate) struct RecordingStore {
    batches: Mutex<Vec<Vec<StoreObject>>>,
    references: Mutex<Vec<RecordedReference>>,
    failing_object: Option<String>,
    failing_reference_call: Option<usize>,
    hanging_reference_call: Option<usize>,
    fail_batch_call: bool,
    short_ack: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_object(mut self, id: &str) -> Self {
        self.failing_object = Some(id.to_string());
        self
    }

    /// The n-th reference call (1-based) fails
    pub fn failing_reference_call(mut self, n: usize) -> Self {
        self.failing_reference_call = Some(n);
        self
    }

    /// The n-th reference call (1-based) is recorded but never completes
    pub fn hanging_reference_call(mut self, n: usize) -> Self {
        self.hanging_reference_call = Some(n);
        self
    }

    pub fn failing_batch_call(mut self) -> Self {
        self.fail_batch_call = true;
        self
    }

    /// Acknowledge one object fewer than submitted
    pub fn short_ack(mut self) -> Self {
        self.short_ack = true;
        self
    }

    pub fn batches(&self) -> Vec<Vec<StoreObject>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn references(&self) -> Vec<RecordedReference> {
        self.references.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn batch_write_objects(&self, objects: &[StoreObject]) -> Result<BatchResult> {
        self.batches.lock().unwrap().push(objects.to_vec());

        if self.fail_batch_call {
            return Err(Error::Write("connection reset".to_string()));
        }

        let mut results: Vec<ObjectResult> = objects
            .iter()
            .map(|o| {
                if self.failing_object.as_deref() == Some(o.id.as_str()) {
                    ObjectResult::failed(&o.id, "invalid object")
                } else {
                    ObjectResult::ok(&o.id)
                }
            })
            .collect();
        if self.short_ack {
            results.pop();
        }

        Ok(BatchResult::new(results))
    }

    async fn create_reference(
        &self,
        source_id: &str,
        reference_property: &str,
        target_class: &str,
        target_id: &str,
    ) -> Result<()> {
        let call = {
            let mut refs = self.references.lock().unwrap();
            refs.push(RecordedReference {
                source_id: source_id.to_string(),
                property: reference_property.to_string(),
                target_class: target_class.to_string(),
                target_id: target_id.to_string(),
            });
            refs.len()
        };

        if self.hanging_reference_call == Some(call) {
            std::future::pending::<()>().await;
        }
        if self.failing_reference_call == Some(call) {
            return Err(Error::Write(format!("reference {} rejected", call)));
        }
        Ok(())
    }
}
