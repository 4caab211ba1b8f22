//! The vector collection interface the pipeline writes to and searches.
//!
//! The collection owns embedding computation and persistence; the core only
//! hands it texts, metadata and ids, and reads back ranked texts with scores.
//! [`SqliteCollection`](crate::sqlite_collection::SqliteCollection) is the
//! bundled implementation.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::ChunkMetadata;

/// Ranked results for a batch of query texts.
///
/// The outer vectors have one entry per query text; the inner vectors are
/// parallel (`documents[q][i]` scored `distances[q][i]`) and ordered from
/// most to least relevant as the store sees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResponse {
    pub documents: Vec<Vec<String>>,
    pub distances: Vec<Vec<f64>>,
}

#[async_trait]
pub trait VectorCollection: Send + Sync {
    /// Store one batch of chunks. The three slices are parallel.
    async fn add(&self, documents: &[String], metadatas: &[ChunkMetadata], ids: &[String])
        -> Result<()>;

    /// Return up to `n_results` hits for each query text.
    async fn query(&self, query_texts: &[String], n_results: usize) -> Result<QueryResponse>;
}
