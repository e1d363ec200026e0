//! Citeseek CLI entrypoint: ask a question against a set of PDF files.
//!
//! Usage: `citeseek <question> <pdf>...`
//!
//! The retrieval half (extract, chunk, embed, rerank, cite) never requires
//! network access. The chat half needs `POE_API_KEY`; without it the
//! assembled prompt is printed instead of an answer so the pipeline stays
//! usable offline.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use futures_util::StreamExt;
use mimalloc::MiMalloc;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use citeseek::cache::EmbeddingCache;
use citeseek::chat::ChatClient;
use citeseek::config::RagConfig;
use citeseek::document::{PdftotextExtractor, chunk_documents};
use citeseek::embedding::{EncoderConfig, MiniLmEmbedder};
use citeseek::prompt::{build_prompt, format_context};
use citeseek::rerank::{CrossEncoder, CrossEncoderConfig, Reranker};
use citeseek::retrieval::retrieve_with_reranking;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(query) = args.next() else {
        eprintln!("usage: citeseek <question> <pdf>...");
        anyhow::bail!("missing question");
    };
    let pdf_paths: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if pdf_paths.is_empty() {
        eprintln!("usage: citeseek <question> <pdf>...");
        anyhow::bail!("no PDF files given");
    }

    let config = RagConfig::from_env()?;
    config.validate()?;

    // Ingest.
    let extractor = PdftotextExtractor::new();
    let paths: Vec<&Path> = pdf_paths.iter().map(PathBuf::as_path).collect();
    let chunks = chunk_documents(&extractor, &paths, config.chunk_size, config.chunk_overlap)?;
    info!(documents = pdf_paths.len(), chunks = chunks.len(), "Corpus chunked");

    // Models. Stub backends keep the pipeline runnable without model files.
    let encoder_config = if let Some(path) = &config.embedder_path {
        EncoderConfig::new(path.clone())
    } else {
        warn!("No CITESEEK_EMBEDDER_PATH configured, running embedder in stub mode");
        EncoderConfig::stub()
    };
    let embedder = MiniLmEmbedder::load(encoder_config)?;
    let cache = EmbeddingCache::new(embedder, config.cache_dir.clone());

    let cross_encoder_config = if let Some(path) = &config.reranker_path {
        CrossEncoderConfig::new(path.clone())
    } else {
        CrossEncoderConfig::stub()
    };
    let reranker = Reranker::new(CrossEncoder::load(cross_encoder_config)?);

    // Retrieve and assemble.
    let results = retrieve_with_reranking(
        &query,
        &chunks,
        &cache,
        &reranker,
        config.retrieval_top_k,
        config.final_top_k,
    )?;

    let context = format_context(&results);
    if context.is_empty() {
        println!("(no relevant context retrieved)\n");
    } else {
        println!("{context}\n");
    }

    let prompt = build_prompt(&query, &results);

    // Answer. A missing key or a failed request never discards the
    // retrieval output above.
    let client = match ChatClient::from_env(&config) {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Chat unavailable, printing assembled prompt instead");
            println!("--- prompt ---\n{prompt}");
            return Ok(());
        }
    };

    match client.complete_streaming(&prompt).await {
        Ok(mut stream) => {
            let mut stdout = tokio::io::stdout();
            while let Some(fragment) = stream.next().await {
                match fragment {
                    Ok(text) => {
                        stdout.write_all(text.as_bytes()).await?;
                        stdout.flush().await?;
                    }
                    Err(e) => {
                        warn!(error = %e, "Chat stream interrupted");
                        break;
                    }
                }
            }
            stdout.write_all(b"\n").await?;
        }
        Err(e) => {
            warn!(error = %e, "Chat request failed, printing assembled prompt instead");
            println!("--- prompt ---\n{prompt}");
        }
    }

    Ok(())
}
