use std::path::PathBuf;

use atlas_rag::groq::GroqModel;
use atlas_rag::{RagConfig, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "atlas")]
#[command(version, about = "Ask questions about ERP manuals, financial reports and tax documents")]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        required = true,
        num_args = 1..,
        help = "Extracted-text documents; pages are separated by form feeds"
    )]
    pub docs: Vec<PathBuf>,

    #[arg(short, long, help = "Answer one question and exit instead of opening the console")]
    pub question: Option<String>,

    #[arg(long, help = "Disable cross-encoder reranking")]
    pub no_rerank: bool,

    #[arg(long, env = "ATLAS_MODEL", default_value_t = GroqModel::default(), help = "Completion model id")]
    pub model: GroqModel,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, help = "Groq API key")]
    pub groq_api_key: String,

    #[arg(long, env = "ATLAS_EMBEDDING_URL", default_value = "http://localhost:8080/v1")]
    pub embedding_url: String,

    #[arg(long, env = "ATLAS_EMBEDDING_API_KEY", hide_env_values = true)]
    pub embedding_api_key: Option<String>,

    #[arg(long, env = "ATLAS_EMBEDDING_MODEL", default_value = atlas_rag::openai::DEFAULT_MODEL)]
    pub embedding_model: String,

    #[arg(long, env = "ATLAS_EMBEDDING_DIMENSIONS", default_value_t = atlas_rag::openai::DEFAULT_DIMENSIONS)]
    pub embedding_dimensions: usize,

    #[arg(long, env = "ATLAS_EMBEDDING_BATCH_SIZE", default_value_t = 32)]
    pub embedding_batch_size: usize,

    #[arg(long, env = "ATLAS_RERANKER_URL", help = "text-embeddings-inference rerank server")]
    pub reranker_url: Option<String>,

    #[arg(long, env = "ATLAS_CHUNK_SIZE", default_value_t = 1000)]
    pub chunk_size: usize,

    #[arg(long, env = "ATLAS_CHUNK_OVERLAP", default_value_t = 200)]
    pub chunk_overlap: usize,

    #[arg(long, env = "ATLAS_TOP_K", default_value_t = 25)]
    pub top_k: usize,

    #[arg(long, env = "ATLAS_CONTEXT_CHUNKS", default_value_t = 5)]
    pub context_chunks: usize,

    #[arg(long, env = "ATLAS_MAX_CONTEXT_CHARS", default_value_t = 6000)]
    pub max_context_chars: usize,

    #[arg(long, env = "ATLAS_JSON_LOGS", help = "Emit logs as JSON lines on stderr")]
    pub json_logs: bool,
}

impl Cli {
    /// Pipeline configuration from the flags.
    pub fn rag_config(&self) -> Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .embedding_batch_size(self.embedding_batch_size)
            .top_k(self.top_k)
            .use_reranking(!self.no_rerank && self.reranker_url.is_some())
            .context_chunks(self.context_chunks)
            .max_context_chars(self.max_context_chars)
            .build()
    }
}
