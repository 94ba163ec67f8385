use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::node::{AstNode, IngestionBatch, Relationship};
use crate::server::AppState;
use crate::store::ObjectStore;

pub const INGEST_AST_PATH: &str = "/ast.ASTGraphService/IngestAST";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestAstRequest {
    #[serde(default)]
    pub ast_nodes: Vec<AstNode>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl From<IngestAstRequest> for IngestionBatch {
    fn from(request: IngestAstRequest) -> Self {
        IngestionBatch::new(request.ast_nodes, request.relationships)
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestAstResponse {
    pub success: bool,
    pub message: String,
    pub ingested_node_ids: Vec<String>,
}

/// RPC status codes surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcCode {
    InvalidArgument,
    Internal,
    Unimplemented,
}

impl RpcCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            RpcCode::InvalidArgument => StatusCode::BAD_REQUEST,
            RpcCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            RpcCode::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: RpcCode,
    pub message: String,
}

pub type RpcError = (StatusCode, Json<ErrorResponse>);

fn rpc_error(code: RpcCode, message: impl Into<String>) -> RpcError {
    (
        code.http_status(),
        Json(ErrorResponse {
            code,
            message: message.into(),
        }),
    )
}

pub async fn ingest_ast<S: ObjectStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<IngestAstRequest>, JsonRejection>,
) -> Result<Json<IngestAstResponse>, RpcError> {
    let Json(request) = payload.map_err(|e| rpc_error(RpcCode::InvalidArgument, e.body_text()))?;

    let summary = state
        .ingestor
        .ingest(IngestionBatch::from(request))
        .await
        .map_err(|e| rpc_error(RpcCode::Internal, e.to_string()))?;

    Ok(Json(IngestAstResponse {
        success: true,
        message: summary.message,
        ingested_node_ids: summary.ingested_node_ids,
    }))
}

pub async fn unimplemented_rpc(method: &'static str) -> RpcError {
    rpc_error(
        RpcCode::Unimplemented,
        format!("method {} not implemented", method),
    )
}
