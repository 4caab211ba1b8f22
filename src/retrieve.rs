//! Confidence-filtered retrieval and answer generation.
//!
//! A query runs one semantic search against the collection, keeps the hits
//! whose score passes the confidence threshold, joins their texts into a
//! context, and asks the [`Generator`] for an answer. Answered questions are
//! appended to the [`QaHistoryStore`].
//!
//! Failures never escape [`Retriever::query`]: they are logged and reported
//! as [`QueryOutcome::Failure`].

use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info};

use crate::collection::VectorCollection;
use crate::error::{Error, Result};
use crate::generation::Generator;
use crate::history::QaHistoryStore;
use crate::models::{FailureKind, QaRecord, QueryOutcome, SearchHit};

/// Separator placed between chunk texts in the generation context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Direction in which the collection's scores improve.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOrder {
    /// Similarity-like scores: a hit passes when `score >= threshold`.
    #[default]
    HigherIsBetter,
    /// Distance-like scores: a hit passes when `score <= threshold`.
    LowerIsBetter,
}

impl ScoreOrder {
    pub fn passes(self, score: f64, threshold: f64) -> bool {
        match self {
            ScoreOrder::HigherIsBetter => score >= threshold,
            ScoreOrder::LowerIsBetter => score <= threshold,
        }
    }
}

/// Keep the hits that pass `threshold`, in their original order.
pub fn filter_hits(hits: Vec<SearchHit>, threshold: f64, order: ScoreOrder) -> Vec<SearchHit> {
    hits.into_iter()
        .filter(|hit| order.passes(hit.score, threshold))
        .collect()
}

/// Join hit texts with a blank line between each.
pub fn assemble_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

pub struct Retriever {
    generator: Arc<dyn Generator>,
    history: Arc<QaHistoryStore>,
    score_order: ScoreOrder,
}

impl Retriever {
    pub fn new(
        generator: Arc<dyn Generator>,
        history: Arc<QaHistoryStore>,
        score_order: ScoreOrder,
    ) -> Self {
        Self {
            generator,
            history,
            score_order,
        }
    }

    /// Answer `query_text` from the `top_n` best hits passing
    /// `confidence_threshold`.
    pub async fn query(
        &self,
        collection: &dyn VectorCollection,
        query_text: &str,
        top_n: usize,
        confidence_threshold: f64,
    ) -> QueryOutcome {
        let hits = match search(collection, query_text, top_n).await {
            Ok(hits) => hits,
            Err(e) => {
                error!(error = %e, "query failed");
                return QueryOutcome::Failure(FailureKind::Search);
            }
        };

        let found = hits.len();
        let passing = filter_hits(hits, confidence_threshold, self.score_order);
        info!(
            found,
            passing = passing.len(),
            threshold = confidence_threshold,
            "retrieved context"
        );

        if passing.is_empty() {
            return QueryOutcome::NoData;
        }

        let context = assemble_context(&passing);
        let answer = match generate(self.generator.as_ref(), query_text, &context).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "query failed");
                return QueryOutcome::Failure(FailureKind::Generation);
            }
        };

        let record = QaRecord {
            question: query_text.to_string(),
            answer,
        };
        if let Err(e) = self.history.append(&record) {
            error!(error = %e, "query failed");
            return QueryOutcome::Failure(FailureKind::Persistence);
        }

        QueryOutcome::Answer(record.answer)
    }
}

/// Run a single-text query and zip the first result row into hits.
async fn search(
    collection: &dyn VectorCollection,
    query_text: &str,
    top_n: usize,
) -> Result<Vec<SearchHit>> {
    let response = collection
        .query(&[query_text.to_string()], top_n)
        .await
        .map_err(|e| Error::Search(format!("{:#}", e)))?;

    let documents = response.documents.into_iter().next().unwrap_or_default();
    let scores = response.distances.into_iter().next().unwrap_or_default();
    if documents.len() != scores.len() {
        return Err(Error::Search(format!(
            "collection returned {} documents but {} scores",
            documents.len(),
            scores.len()
        )));
    }

    Ok(documents
        .into_iter()
        .zip(scores)
        .map(|(text, score)| SearchHit { text, score })
        .collect())
}

async fn generate(generator: &dyn Generator, query_text: &str, context: &str) -> Result<String> {
    generator
        .generate(query_text, context)
        .await
        .map_err(|e| Error::Generation(format!("{:#}", e)))
}
