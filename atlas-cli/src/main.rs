//! `atlas`: ask questions about Turkish enterprise documents from the terminal.
//!
//! Requires `GROQ_API_KEY` and an OpenAI-compatible embeddings server
//! (`ATLAS_EMBEDDING_URL`). Set `ATLAS_RERANKER_URL` to enable reranking.
//!
//! ```text
//! atlas --docs vergi_kanunu.txt amortisman.txt
//! atlas --docs rapor.txt --question "2024 cirosu nedir?" --no-rerank
//! ```

mod cli;
mod console;
mod loader;

use std::sync::Arc;

use atlas_rag::RetrievalPipeline;
use atlas_rag::openai::OpenAIEmbeddingModel;
use atlas_rag::tei::TeiCrossEncoder;
use atlas_telemetry::LogFormat;
use clap::Parser;
use tracing::info;

use crate::cli::Cli;
use crate::console::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let format = if cli.json_logs { LogFormat::Json } else { LogFormat::Text };
    atlas_telemetry::init("atlas", format).map_err(|e| anyhow::anyhow!(e))?;

    let config = cli.rag_config()?;

    let mut embedding = OpenAIEmbeddingModel::new(&cli.embedding_url)?
        .with_model(&cli.embedding_model)
        .with_dimensions(cli.embedding_dimensions);
    if let Some(key) = &cli.embedding_api_key {
        embedding = embedding.with_api_key(key);
    }

    let mut builder = RetrievalPipeline::builder().config(config).embedding_model(Arc::new(embedding));
    if let Some(url) = &cli.reranker_url {
        builder = builder.cross_encoder(Arc::new(TeiCrossEncoder::new(url)?));
    }
    let pipeline = builder.build()?;

    let documents = loader::load_documents(&cli.docs)?;
    println!("{} sayfa işleniyor...", documents.len());
    let report = pipeline.process(&documents).await?;
    info!(
        documents = report.documents,
        chunk_count = report.chunks,
        dimensions = report.dimensions,
        "index ready"
    );
    println!("{} parça indekslendi.\n", report.chunks);

    let session = Session::new(pipeline, cli.groq_api_key.clone(), cli.model)?;
    match &cli.question {
        Some(question) => session.ask(question).await,
        None => session.run_console().await,
    }
}
