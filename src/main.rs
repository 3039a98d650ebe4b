//! # PMP.AI knowledge pipeline CLI
//!
//! Usage:
//!   pmpai serve                          # Start the HTTP gateway
//!   pmpai ingest plan.pdf --category pm  # Extract, store, and vectorize a file
//!   pmpai search "风险管理"              # Query the corpus
//!   pmpai ask "项目预算是多少?"          # Retrieval-augmented answer

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pmpai_core::config::PmpConfig;
use pmpai_core::traits::{DocumentRepository, Summarizer, Tagger};
use pmpai_core::types::{Document, SearchFilter};
use pmpai_extract::TextExtractor;
use pmpai_knowledge::mock::{ExtractiveSummarizer, KeywordTagger};
use pmpai_knowledge::{RetrievalEngine, SqliteKnowledgeStore};

#[derive(Parser)]
#[command(name = "pmpai", version, about = "PMP.AI document ingestion and retrieval pipeline")]
struct Cli {
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway server
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Extract, store, and vectorize a local file
    Ingest {
        /// Path to the document (txt, md, docx, pdf)
        path: PathBuf,
        /// Document title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
        #[arg(long, default_value = "")]
        category: String,
        /// Comma-separated tags; auto-tagged when omitted
        #[arg(long)]
        tags: Option<String>,
    },
    /// Search the corpus
    Search {
        query: String,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Ask a question grounded in the corpus
    Ask {
        question: String,
        /// Restrict retrieval to one project
        #[arg(long)]
        project: Option<String>,
    },
}

fn open_engine(config: &PmpConfig) -> Result<(Arc<dyn DocumentRepository>, RetrievalEngine)> {
    let db_path = expand_path(&config.knowledge.db_path);
    let repo: Arc<dyn DocumentRepository> = Arc::new(SqliteKnowledgeStore::open(&db_path)?);
    let embedder = pmpai_providers::create_embedder(config)?;
    let composer = pmpai_providers::create_composer(config)?;
    let engine = RetrievalEngine::new(repo.clone(), embedder, composer, config);
    Ok((repo, engine))
}

fn expand_path(p: &str) -> PathBuf {
    if let Some(rest) = p.strip_prefix("~/") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest)
    } else {
        PathBuf::from(p)
    }
}

fn guess_mime(path: &PathBuf) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "md" | "markdown" => "text/markdown",
        _ => "text/plain",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "pmpai=debug,tower_http=debug"
    } else {
        "pmpai=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let mut config = PmpConfig::load()?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            pmpai_gateway::start(config).await?;
        }

        Command::Ingest {
            path,
            title,
            category,
            tags,
        } => {
            let (repo, engine) = open_engine(&config)?;
            let bytes = std::fs::read(&path)?;
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload")
                .to_string();

            let extractor = TextExtractor::new(config.knowledge.min_text_len);
            let text = extractor.extract(&bytes, guess_mime(&path), &filename)?;

            let mut doc = Document::new(
                title.as_deref().unwrap_or(&filename),
                &category,
                "ingest",
            );
            doc.file_size = bytes.len() as u64;
            doc.tags = match tags {
                Some(t) => t.split(',').map(|s| s.trim().to_string()).collect(),
                None => KeywordTagger::default().tag(&text, 5).await?,
            };
            doc.summary = ExtractiveSummarizer::default().summarize(&text).await?;
            doc.raw_text = text;
            repo.insert_document(&doc)?;

            let outcome = engine.vectorize(&doc.id, None, None).await?;
            println!(
                "Ingested '{}' → document {} ({} chunks)",
                filename, doc.id, outcome.chunk_count
            );
        }

        Command::Search { query, limit } => {
            let (_repo, engine) = open_engine(&config)?;
            let page = engine
                .search(&query, &SearchFilter::default(), limit, 0)
                .await?;
            println!("{} result(s) in {:.3}s", page.total, page.time_taken);
            for hit in page.results {
                println!("  {:.3}  [{}] {}", hit.score, hit.title, hit.excerpt);
            }
        }

        Command::Ask { question, project } => {
            let (_repo, engine) = open_engine(&config)?;
            let qa = engine
                .answer(&question, project.as_deref(), &SearchFilter::default())
                .await?;
            println!("{}\n", qa.answer);
            println!("Sources ({:.3}s):", qa.time_taken);
            for s in qa.sources {
                println!("  {:.3}  {}", s.score, s.title);
            }
        }
    }

    Ok(())
}
