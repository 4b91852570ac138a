use async_trait::async_trait;

use crate::core::errors::ApiError;

pub type Embedding = Vec<f32>;

/// Maps text to vectors usable for similarity ranking.
///
/// Shared across requests, so implementations must be safe for concurrent use.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed documents for storage. The result has the same length and order as `texts`.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>, ApiError>;

    /// Embed a search query.
    async fn embed_one(&self, text: &str) -> Result<Embedding, ApiError>;
}
