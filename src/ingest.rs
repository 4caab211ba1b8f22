//! Ingestion pipeline orchestration.
//!
//! Coordinates the upload flow: read → chunk → label → batched insert into a
//! [`VectorCollection`]. Batches are issued strictly one after another; a
//! failing batch aborts the rest, and batches already written stay written.

use std::path::Path;

use tracing::{debug, info};

use crate::chunk::chunk_text;
use crate::collection::VectorCollection;
use crate::error::{Error, Result};
use crate::extract::load_document;
use crate::models::{Chunk, ChunkMetadata, IngestReport};

pub struct IngestionPipeline {
    chunk_max_chars: usize,
    batch_size: usize,
}

impl IngestionPipeline {
    /// `batch_size` is clamped to at least 1.
    pub fn new(chunk_max_chars: usize, batch_size: usize) -> Self {
        Self {
            chunk_max_chars,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Read, chunk, and insert the document at `path`.
    ///
    /// A document that yields no chunks is skipped without touching the
    /// collection.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub async fn ingest(
        &self,
        collection: &dyn VectorCollection,
        path: &Path,
    ) -> Result<IngestReport> {
        let document = load_document(path)?;
        let texts = chunk_text(&document.text, self.chunk_max_chars);
        let chunks = prepare_chunks(&document.name, texts);

        if chunks.is_empty() {
            info!(source = %document.name, "no chunks produced, skipping insert");
            return Ok(IngestReport {
                source: document.name,
                chunks: 0,
                batches: 0,
            });
        }

        let mut batches = 0usize;
        for batch in chunks.chunks(self.batch_size) {
            let documents: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let metadatas: Vec<ChunkMetadata> = batch.iter().map(Chunk::metadata).collect();
            let ids: Vec<String> = batch.iter().map(Chunk::id).collect();

            collection
                .add(&documents, &metadatas, &ids)
                .await
                .map_err(|e| Error::Insertion {
                    path: path.to_path_buf(),
                    batch: batches,
                    reason: format!("{:#}", e),
                })?;

            debug!(
                source = %document.name,
                batch = batches,
                first = batch[0].index,
                size = batch.len(),
                "batch inserted"
            );
            batches += 1;
        }

        info!(
            source = %document.name,
            chunks = chunks.len(),
            batches,
            "document ingested"
        );

        Ok(IngestReport {
            source: document.name,
            chunks: chunks.len(),
            batches,
        })
    }
}

/// Label chunk texts of the document `name` with contiguous indices.
pub fn prepare_chunks(name: &str, texts: Vec<String>) -> Vec<Chunk> {
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk {
            source_document: name.to_string(),
            index,
            text,
        })
        .collect()
}
