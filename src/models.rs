//! Core data models used throughout docqa.
//!
//! These types represent the documents, chunks, search hits, and question/
//! answer records that flow through the ingestion and retrieval pipeline.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Document kind, resolved once from the file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    Text,
    Pdf,
    Docx,
    /// Lowercased extension (with leading dot, or empty when there is none).
    Unsupported(String),
}

impl FileType {
    /// Resolve the file type from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" => FileType::Text,
            "pdf" => FileType::Pdf,
            "docx" => FileType::Docx,
            "" => FileType::Unsupported(String::new()),
            other => FileType::Unsupported(format!(".{}", other)),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FileType::Unsupported(_))
    }
}

/// A document whose raw text has been read.
#[derive(Debug, Clone)]
pub struct Document {
    /// Base filename; the identity used for chunk ids and metadata.
    pub name: String,
    pub file_type: FileType,
    pub text: String,
}

/// A sentence-aligned piece of a document's text.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub source_document: String,
    pub index: usize,
    pub text: String,
}

impl Chunk {
    /// `"{source_document}_chunk_{index}"`.
    pub fn id(&self) -> String {
        format!("{}_chunk_{}", self.source_document, self.index)
    }

    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            source: self.source_document.clone(),
            chunk: self.index,
        }
    }
}

/// Metadata stored alongside every chunk in the vector collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    pub chunk: usize,
}

/// A chunk text returned by semantic search, with its store-defined score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub score: f64,
}

/// One question and the answer that was given for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
}

/// Summary of a single document ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub source: String,
    pub chunks: usize,
    pub batches: usize,
}

/// Which stage of a query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Search,
    Generation,
    Persistence,
}

/// Result of a retrieval-augmented query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Answer(String),
    /// No hit passed the confidence filter.
    NoData,
    Failure(FailureKind),
}

pub const NO_DATA_MESSAGE: &str = "Data Not Available";
pub const FAILURE_MESSAGE: &str =
    "An error occurred while processing your query. Please try again later.";

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Answer(text) => f.write_str(text),
            QueryOutcome::NoData => f.write_str(NO_DATA_MESSAGE),
            QueryOutcome::Failure(_) => f.write_str(FAILURE_MESSAGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_is_case_insensitive() {
        assert_eq!(FileType::from_path(Path::new("a/B.TXT")), FileType::Text);
        assert_eq!(FileType::from_path(Path::new("report.Pdf")), FileType::Pdf);
        assert_eq!(FileType::from_path(Path::new("memo.DOCX")), FileType::Docx);
    }

    #[test]
    fn unknown_extensions_are_unsupported() {
        assert_eq!(
            FileType::from_path(Path::new("notes.md")),
            FileType::Unsupported(".md".to_string())
        );
        assert_eq!(
            FileType::from_path(Path::new("Makefile")),
            FileType::Unsupported(String::new())
        );
    }

    #[test]
    fn chunk_id_and_metadata() {
        let chunk = Chunk {
            source_document: "policy.pdf".to_string(),
            index: 2,
            text: "x".to_string(),
        };
        assert_eq!(chunk.id(), "policy.pdf_chunk_2");
        assert_eq!(
            serde_json::to_value(chunk.metadata()).unwrap(),
            serde_json::json!({"source": "policy.pdf", "chunk": 2})
        );
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(QueryOutcome::Answer("42".into()).to_string(), "42");
        assert_eq!(QueryOutcome::NoData.to_string(), "Data Not Available");
        assert_eq!(
            QueryOutcome::Failure(FailureKind::Search).to_string(),
            FAILURE_MESSAGE
        );
    }
}
