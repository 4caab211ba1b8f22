//! SQLite-backed [`VectorCollection`].
//!
//! Chunk texts are embedded with the configured [`Embedder`] and stored with
//! their metadata in `collection_chunks`. Every vector must have exactly
//! [`Embedder::dims`] values, and a query fails rather than scoring rows
//! stored with a different dimensionality. Queries embed the query text and
//! score every stored vector with brute-force cosine similarity, which is
//! plenty for the document counts a single user uploads.

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::collection::{QueryResponse, VectorCollection};
use crate::config::ScoreMetric;
use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, Embedder};
use crate::models::ChunkMetadata;

pub struct SqliteCollection {
    pool: SqlitePool,
    name: String,
    metric: ScoreMetric,
    embedder: Box<dyn Embedder>,
}

impl SqliteCollection {
    /// Wrap `pool`; the schema must already exist (see [`crate::migrate`]).
    pub fn new(
        pool: SqlitePool,
        name: impl Into<String>,
        metric: ScoreMetric,
        embedder: Box<dyn Embedder>,
    ) -> Self {
        Self {
            pool,
            name: name.into(),
            metric,
            embedder,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of chunks stored in this collection.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM collection_chunks WHERE collection = ?")
                .bind(&self.name)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Embed `texts`, requiring one vector per text of exactly `dims()` values.
    async fn embed_checked(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.embedder.embed(texts).await?;
        if vectors.len() != texts.len() {
            bail!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            );
        }
        let dims = self.embedder.dims();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
            bail!(
                "embedder {} returned a {}-dimensional vector, expected {}",
                self.embedder.model_name(),
                bad.len(),
                dims
            );
        }
        Ok(vectors)
    }

    async fn rank(&self, query_vec: &[f32], n_results: usize) -> Result<(Vec<String>, Vec<f64>)> {
        let rows = sqlx::query(
            "SELECT id, document, embedding, dims FROM collection_chunks WHERE collection = ? ORDER BY id",
        )
        .bind(&self.name)
        .fetch_all(&self.pool)
        .await?;

        let mut scored: Vec<(String, f64)> = Vec::with_capacity(rows.len());
        for row in &rows {
            let stored_dims: i64 = row.get("dims");
            if stored_dims != query_vec.len() as i64 {
                let id: String = row.get("id");
                bail!(
                    "chunk {} in collection '{}' has {} dimensions but the embedder produces {}; re-upload the documents",
                    id,
                    self.name,
                    stored_dims,
                    query_vec.len()
                );
            }
            let document: String = row.get("document");
            let blob: Vec<u8> = row.get("embedding");
            let sim = cosine_similarity(query_vec, &blob_to_vec(&blob)) as f64;
            scored.push((document, sim));
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(n_results);

        let metric = self.metric;
        Ok(scored
            .into_iter()
            .map(|(document, sim)| {
                let score = match metric {
                    ScoreMetric::CosineSimilarity => sim,
                    ScoreMetric::CosineDistance => 1.0 - sim,
                };
                (document, score)
            })
            .unzip())
    }
}

#[async_trait]
impl VectorCollection for SqliteCollection {
    async fn add(
        &self,
        documents: &[String],
        metadatas: &[ChunkMetadata],
        ids: &[String],
    ) -> Result<()> {
        if documents.len() != metadatas.len() || documents.len() != ids.len() {
            bail!(
                "mismatched batch: {} documents, {} metadatas, {} ids",
                documents.len(),
                metadatas.len(),
                ids.len()
            );
        }

        let vectors = self.embed_checked(documents).await?;

        let mut tx = self.pool.begin().await?;
        for (((document, metadata), id), vector) in
            documents.iter().zip(metadatas).zip(ids).zip(&vectors)
        {
            sqlx::query(
                r#"
                INSERT INTO collection_chunks (collection, id, document, metadata_json, embedding, dims, model)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(collection, id) DO UPDATE SET
                    document = excluded.document,
                    metadata_json = excluded.metadata_json,
                    embedding = excluded.embedding,
                    dims = excluded.dims,
                    model = excluded.model
                "#,
            )
            .bind(&self.name)
            .bind(id)
            .bind(document)
            .bind(serde_json::to_string(metadata)?)
            .bind(vec_to_blob(vector))
            .bind(vector.len() as i64)
            .bind(self.embedder.model_name())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!(collection = %self.name, rows = ids.len(), "chunks stored");
        Ok(())
    }

    async fn query(&self, query_texts: &[String], n_results: usize) -> Result<QueryResponse> {
        let query_vecs = self.embed_checked(query_texts).await?;

        let mut response = QueryResponse::default();
        for query_vec in &query_vecs {
            let (documents, distances) = self.rank(query_vec, n_results).await?;
            response.documents.push(documents);
            response.distances.push(distances);
        }
        Ok(response)
    }
}
