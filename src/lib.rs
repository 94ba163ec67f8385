//! # AstGraph - AST ingestion proxy
//!
//! Accepts batches of parsed AST nodes plus typed relationships and writes
//! them into a schema-less object store as `ASTNode` objects and
//! cross-references.
//!
//! AstGraph provides:
//! - A typed data model for AST nodes, spans and relationships
//! - A pure translator from AST nodes to store objects
//! - A network store client with startup readiness polling
//! - A two-phase ingestion orchestrator (objects, then edges) with fail-fast semantics
//! - A JSON RPC surface exposing `IngestAST`

pub mod config;
pub mod ingest;
pub mod node;
pub mod server;
pub mod store;
pub mod translate;

// Re-exports for convenient access
pub use config::ProxyConfig;
pub use ingest::{IngestSummary, Ingestor};
pub use node::{AstNode, IngestionBatch, Relationship, Span};
pub use store::{HttpStore, ObjectStore, StoreObject};
pub use translate::{Translation, TranslationWarning, translate_node};

/// Result type alias for AstGraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for AstGraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Store not ready after {attempts} attempts")]
    NotReady { attempts: u32 },

    #[error("Write error: {0}")]
    Write(String),

    #[error("failed to ingest nodes: {0}")]
    NodeWrite(String),

    #[error("failed to create relationship {relationship}: {reason}")]
    ReferenceWrite { relationship: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),
}
