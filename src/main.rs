//! Citeguard command-line entrypoint.
//!
//! ```text
//! citeguard "How does sparse retrieval compare to dense retrieval?"
//! ```
//!
//! Prints the [`FinalAnswer`](citeguard::FinalAnswer) as pretty JSON on stdout. Logs go
//! to stderr and are filtered with `RUST_LOG`.

use std::sync::Arc;

use anyhow::{Context, bail};
use mimalloc::MiMalloc;

use citeguard::Orchestrator;
use citeguard::config::Config;
use citeguard::embedding::{
    CachedEmbedder, Embedder, HashingEmbedder, OllamaEmbedder, OllamaEmbedderConfig,
};
use citeguard::llm::{GenaiGenerator, GenaiGeneratorConfig};
use citeguard::retrieval::{
    HttpRetriever, HttpRetrieverConfig, Hydrator, HybridRetriever, JsonChunkStore,
    PassthroughHydrator, Retriever,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if question.trim().is_empty() {
        bail!("usage: citeguard <question>");
    }

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        retriever = %config.retriever_url,
        hybrid = config.sparse_retriever_url.is_some(),
        llm = %config.llm_model,
        mode = %config.answer_mode,
        "Citeguard starting"
    );

    let retriever = build_retriever(&config)?;
    let hydrator = build_hydrator(&config)?;
    let embedder = build_embedder(&config)?;
    let generator = Arc::new(GenaiGenerator::new(
        GenaiGeneratorConfig::new(config.llm_model.clone()).with_timeout(config.llm_timeout),
    ));

    let orchestrator = Orchestrator::new(
        retriever,
        hydrator,
        generator,
        embedder,
        config.orchestrator_config(),
    )?;

    let answer = orchestrator.answer(&question).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&answer).context("failed to serialize answer")?
    );

    Ok(())
}

fn build_retriever(config: &Config) -> anyhow::Result<Arc<dyn Retriever>> {
    let dense = HttpRetriever::new(
        HttpRetrieverConfig::new(config.retriever_url.clone())
            .with_top_k(config.top_k)
            .with_timeout(config.retriever_timeout)
            .with_name("dense"),
    )?;

    let Some(sparse_url) = &config.sparse_retriever_url else {
        return Ok(Arc::new(dense));
    };

    let sparse = HttpRetriever::new(
        HttpRetrieverConfig::new(sparse_url.clone())
            .with_top_k(config.top_k)
            .with_timeout(config.retriever_timeout)
            .with_name("sparse"),
    )?;

    let hybrid = HybridRetriever::new(
        vec![
            Arc::new(dense) as Arc<dyn Retriever>,
            Arc::new(sparse) as Arc<dyn Retriever>,
        ],
        config.rrf_k,
        config.top_k,
    )?;
    Ok(Arc::new(hybrid))
}

fn build_hydrator(config: &Config) -> anyhow::Result<Arc<dyn Hydrator>> {
    match &config.chunks_dir {
        Some(dir) => Ok(Arc::new(JsonChunkStore::new(dir.clone())?)),
        None => {
            tracing::warn!("No CITEGUARD_CHUNKS_DIR configured, using retrieved text as-is");
            Ok(Arc::new(PassthroughHydrator))
        }
    }
}

fn build_embedder(config: &Config) -> anyhow::Result<Arc<dyn Embedder>> {
    match &config.embedder_url {
        Some(url) => {
            let ollama = OllamaEmbedder::new(
                OllamaEmbedderConfig::new(url.clone())
                    .with_model(config.embed_model.clone())
                    .with_timeout(config.embedder_timeout),
            )?;
            Ok(Arc::new(CachedEmbedder::new(ollama)))
        }
        None => {
            tracing::warn!("No CITEGUARD_EMBEDDER_URL configured, using hashing embedder");
            Ok(Arc::new(CachedEmbedder::new(HashingEmbedder::default())))
        }
    }
}
