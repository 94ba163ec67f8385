//! AST data model
//!
//! Nodes arrive fully formed from a parser upstream: identity is assigned
//! there and never rewritten here. Every node carries:
//! - a node-type tag and a byte/line `Span`
//! - the source snippet, file path and revision it came from
//! - an optional opaque annotation payload
//!
//! Relationships are directed, labelled edges between node ids. The label
//! becomes the store's cross-reference property name.

use serde::{Deserialize, Serialize};

/// Byte and line extent of a node in its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Span {
    pub start_byte: i32,
    pub end_byte: i32,
    pub start_line: i32,
    pub end_line: i32,
}

impl Span {
    pub fn new(start_byte: i32, end_byte: i32, start_line: i32, end_line: i32) -> Self {
        Self {
            start_byte,
            end_byte,
            start_line,
            end_line,
        }
    }
}

/// A single parsed AST node.
///
/// `A` is the annotation payload type. Over the wire it is arbitrary JSON;
/// in-process callers may attach any `Serialize` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNode<A = serde_json::Value> {
    /// Globally unique id, used by the store as the primary key
    pub id: String,
    /// Grammar node kind (e.g. `function_definition`)
    #[serde(default)]
    pub node_type: String,
    #[serde(flatten)]
    pub span: Span,
    #[serde(default)]
    pub source_code_snippet: String,
    #[serde(default)]
    pub file_path: String,
    /// Revision the file was parsed at (usually a commit hash)
    #[serde(default)]
    pub git_commit_hash: String,
    #[serde(default)]
    pub name: String,
    /// Auxiliary metadata; not needed for identity or graph structure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<A>,
}

impl AstNode {
    /// Create a node with identity and type; everything else starts empty.
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            span: Span::default(),
            source_code_snippet: String::new(),
            file_path: String::new(),
            git_commit_hash: String::new(),
            name: String::new(),
            annotations: None,
        }
    }
}

impl<A> AstNode<A> {
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.source_code_snippet = snippet.into();
        self
    }

    /// Set originating file path and revision
    pub fn with_origin(
        mut self,
        file_path: impl Into<String>,
        git_commit_hash: impl Into<String>,
    ) -> Self {
        self.file_path = file_path.into();
        self.git_commit_hash = git_commit_hash.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach an annotation payload, possibly changing the payload type.
    pub fn with_annotations<B>(self, annotations: B) -> AstNode<B> {
        AstNode {
            id: self.id,
            node_type: self.node_type,
            span: self.span,
            source_code_snippet: self.source_code_snippet,
            file_path: self.file_path,
            git_commit_hash: self.git_commit_hash,
            name: self.name,
            annotations: Some(annotations),
        }
    }
}

/// A directed, typed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub source_node_id: String,
    pub target_node_id: String,
    /// Used verbatim as the cross-reference property name (e.g. `hasChild`)
    pub relationship_type: String,
}

impl Relationship {
    pub fn new(
        source_node_id: impl Into<String>,
        target_node_id: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            source_node_id: source_node_id.into(),
            target_node_id: target_node_id.into(),
            relationship_type: relationship_type.into(),
        }
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -[{}]-> {}",
            self.source_node_id, self.relationship_type, self.target_node_id
        )
    }
}

/// One unit of ingestion: nodes first, then the edges between them.
///
/// Built per request and consumed by a single ingest call. The store does
/// not apply it atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionBatch<A = serde_json::Value> {
    pub nodes: Vec<AstNode<A>>,
    pub relationships: Vec<Relationship>,
}

impl<A> IngestionBatch<A> {
    pub fn new(nodes: Vec<AstNode<A>>, relationships: Vec<Relationship>) -> Self {
        Self {
            nodes,
            relationships,
        }
    }

    /// A batch without nodes has nothing to write, whatever its edges say.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in input order
    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }
}
