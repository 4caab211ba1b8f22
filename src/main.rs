//! # docqa CLI
//!
//! ## Usage
//!
//! ```bash
//! docqa --config ./config/docqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docqa init` | Create the SQLite database and schema |
//! | `docqa upload <path>...` | Copy files into the upload folder and ingest them |
//! | `docqa ask "<question>"` | Answer a question from the ingested documents |
//! | `docqa history` | Show previously answered questions |
//! | `docqa chunk <file>` | Preview how a file would be chunked |
//!
//! Logs go to stderr; set `RUST_LOG` (default `docqa=info`) to adjust.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docqa::chunk::chunk_text;
use docqa::config::{self, Config};
use docqa::embedding::create_embedder;
use docqa::extract::load_document;
use docqa::generation::ChatGenerator;
use docqa::history::QaHistoryStore;
use docqa::ingest::{prepare_chunks, IngestionPipeline};
use docqa::retrieve::Retriever;
use docqa::sqlite_collection::SqliteCollection;
use docqa::{db, migrate, upload};

/// docqa: ask questions about your documents.
#[derive(Parser)]
#[command(name = "docqa", version, about = "Document question answering with retrieval-augmented generation")]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Missing sections fall back to defaults.
    #[arg(long, global = true, default_value = "./config/docqa.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema. Safe to run repeatedly.
    Init,

    /// Copy documents into the upload folder and ingest them.
    ///
    /// Directories are searched recursively for .txt, .pdf, and .docx files.
    Upload {
        /// Files or directories to upload.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Answer a question from the ingested documents.
    Ask {
        question: String,

        /// Number of chunks to retrieve.
        #[arg(long)]
        top_n: Option<usize>,

        /// Minimum confidence a chunk needs to be used as context.
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Show recorded questions and answers.
    History {
        /// Only show the most recent N entries.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the chunks a document would be split into, without storing them.
    Chunk {
        file: PathBuf,

        /// Override the configured chunk size.
        #[arg(long)]
        max_chars: Option<usize>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docqa=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load(path: &std::path::Path) -> Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::warn!(config = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

async fn open_collection(cfg: &Config) -> Result<SqliteCollection> {
    let pool = db::connect(cfg).await?;
    migrate::run_migrations(&pool).await?;
    let embedder = create_embedder(&cfg.embedding)?;
    Ok(SqliteCollection::new(
        pool,
        cfg.collection.name.clone(),
        cfg.collection.metric,
        embedder,
    ))
}

async fn run_upload(cfg: &Config, paths: &[PathBuf]) -> Result<()> {
    let files = upload::expand_inputs(paths)?;
    if files.is_empty() {
        bail!("no documents to upload");
    }

    let collection = open_collection(cfg).await?;
    let pipeline = IngestionPipeline::new(cfg.chunking.max_chars, cfg.ingestion.batch_size);

    for file in &files {
        let stored = upload::copy_into_uploads(&cfg.uploads.folder, file)?;
        let report = pipeline
            .ingest(&collection, &stored)
            .await
            .with_context(|| format!("Failed to ingest {}", file.display()))?;
        println!(
            "{}: {} chunks in {} batches",
            report.source, report.chunks, report.batches
        );
    }

    println!("collection '{}': {} chunks", collection.name(), collection.count().await?);
    Ok(())
}

async fn run_ask(cfg: &Config, question: &str, top_n: Option<usize>, threshold: Option<f64>) -> Result<()> {
    let collection = open_collection(cfg).await?;
    let generator = Arc::new(ChatGenerator::new(&cfg.llm)?);
    let history = Arc::new(QaHistoryStore::new(&cfg.history.path));
    let retriever = Retriever::new(generator, history, cfg.retrieval.score_order);

    let outcome = retriever
        .query(
            &collection,
            question,
            top_n.unwrap_or(cfg.retrieval.n_results),
            threshold.unwrap_or(cfg.retrieval.confidence_threshold),
        )
        .await;
    println!("{}", outcome);
    Ok(())
}

fn run_history(cfg: &Config, limit: Option<usize>) -> Result<()> {
    let store = QaHistoryStore::new(&cfg.history.path);
    let records = store.load()?;
    if records.is_empty() {
        tracing::info!(path = %store.path().display(), "no questions recorded yet");
        return Ok(());
    }
    let skip = limit.map_or(0, |n| records.len().saturating_sub(n));
    for record in records.iter().skip(skip) {
        println!("Q: {}", record.question);
        println!("A: {}", record.answer);
        println!();
    }
    Ok(())
}

fn run_chunk(cfg: &Config, file: &std::path::Path, max_chars: Option<usize>) -> Result<()> {
    let max_chars = max_chars.unwrap_or(cfg.chunking.max_chars);
    if max_chars == 0 {
        bail!("--max-chars must be > 0");
    }
    let document = load_document(file)?;
    tracing::debug!(name = %document.name, file_type = ?document.file_type, "document loaded");
    let chunks = prepare_chunks(&document.name, chunk_text(&document.text, max_chars));
    for chunk in &chunks {
        println!("{} ({} chars)", chunk.id(), chunk.text.chars().count());
    }
    println!("{} chunks", chunks.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = load(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized at {}", cfg.db.path.display());
        }
        Commands::Upload { paths } => run_upload(&cfg, &paths).await?,
        Commands::Ask {
            question,
            top_n,
            threshold,
        } => run_ask(&cfg, &question, top_n, threshold).await?,
        Commands::History { limit } => run_history(&cfg, limit)?,
        Commands::Chunk { file, max_chars } => run_chunk(&cfg, &file, max_chars)?,
    }

    Ok(())
}
