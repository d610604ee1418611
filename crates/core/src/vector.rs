//! Core value types: stored vectors, their metadata, and search results.
//!
//! A [`Vector`] is the unit of storage: a caller-supplied id, a fixed-dimension
//! f32 embedding, and an opaque [`Metadata`] record the index returns verbatim
//! and never inspects.

use serde::{Deserialize, Serialize};

/// Source-document metadata attached to a stored vector.
///
/// Opaque to the index layer: carried through insert and returned unchanged
/// in search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Identifier of the source document.
    pub document_id: String,
    /// Position of this chunk within the document.
    pub chunk_index: usize,
    /// Raw text of the chunk.
    pub text: String,
    /// Page number within the source document, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

/// A stored embedding with its caller-supplied id and metadata.
///
/// Ids must be non-empty; uniqueness within an index is the caller's
/// responsibility. Vectors are immutable once inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vector {
    pub id: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A single search hit: the stored vector's id and metadata, scored by
/// cosine similarity (higher is better, range \[-1, 1\]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    pub metadata: Metadata,
}
