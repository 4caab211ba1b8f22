//! # docqa
//!
//! Ask questions about your documents. Uploaded files are read, split into
//! sentence-aligned chunks, and stored in a vector collection; questions are
//! answered by a language model grounded in the chunks that pass a
//! confidence threshold.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌─────────┐   ┌───────────┐   ┌────────────┐
//! │  extract  │──▶│  chunk  │──▶│  ingest   │──▶│ collection │
//! │ txt/pdf/  │   │sentences│   │ ids+meta, │   │  (SQLite)  │
//! │   docx    │   └─────────┘   │  batches  │   └─────┬──────┘
//! └───────────┘                 └───────────┘         │
//!                                                      ▼
//!                   ┌─────────┐   ┌────────────┐   ┌──────────┐
//!                   │ history │◀──│ generation │◀──│ retrieve │
//!                   │ (JSON)  │   │   (LLM)    │   │ filter + │
//!                   └─────────┘   └────────────┘   │ context  │
//!                                                  └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`extract`] | Read text from `.txt`, `.pdf`, `.docx` |
//! | [`chunk`] | Sentence-packing chunker |
//! | [`ingest`] | Batched ingestion into a collection |
//! | [`retrieve`] | Confidence-filtered retrieval and answering |
//! | [`history`] | Question/answer history file |
//! | [`collection`] | Vector collection trait |
//! | [`sqlite_collection`] | SQLite-backed collection |
//! | [`embedding`] | Embedding clients and vector helpers |
//! | [`generation`] | Answer generation trait and chat client |
//! | [`config`] | TOML configuration |
//! | [`upload`] | Upload folder management |

pub mod chunk;
pub mod collection;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod generation;
pub mod history;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod retrieve;
pub mod sqlite_collection;
pub mod upload;

pub use error::{Error, Result};
