//! Node translation - AST node to store object
//!
//! Pure mapping: every scalar node field lands under a fixed property name,
//! and the annotation payload, if any, is serialized to compact JSON text.
//!
//! A payload that fails to serialize never fails the translation. The
//! annotation property is left out and a `TranslationWarning` is returned
//! next to the object so the caller can report it.

use serde::Serialize;

use crate::node::AstNode;
use crate::store::{AST_NODE_CLASS, AstNodeProperties, StoreObject};

/// Annotation payload of a node could not be serialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationWarning {
    pub node_id: String,
    pub reason: String,
}

impl std::fmt::Display for TranslationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "annotations of node {} omitted: {}",
            self.node_id, self.reason
        )
    }
}

/// A translated node plus any warning raised on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub object: StoreObject,
    pub warning: Option<TranslationWarning>,
}

/// Serialize an annotation payload for storage in a text property.
pub fn serialize_annotations<A: Serialize>(payload: &A) -> serde_json::Result<String> {
    serde_json::to_string(payload)
}

/// Translate one AST node into an `ASTNode` store object.
pub fn translate_node<A: Serialize>(node: &AstNode<A>) -> Translation {
    let (annotations, warning) = match &node.annotations {
        None => (None, None),
        Some(payload) => match serialize_annotations(payload) {
            Ok(text) => (Some(text), None),
            Err(e) => (
                None,
                Some(TranslationWarning {
                    node_id: node.id.clone(),
                    reason: e.to_string(),
                }),
            ),
        },
    };

    let properties = AstNodeProperties {
        node_type: node.node_type.clone(),
        start_byte: node.span.start_byte,
        end_byte: node.span.end_byte,
        start_line: node.span.start_line,
        end_line: node.span.end_line,
        source_code_snippet: node.source_code_snippet.clone(),
        file_path: node.file_path.clone(),
        git_commit_hash: node.git_commit_hash.clone(),
        name: node.name.clone(),
        annotations,
    };

    Translation {
        object: StoreObject {
            class: AST_NODE_CLASS.to_string(),
            id: node.id.clone(),
            properties,
        },
        warning,
    }
}
