//! Embedding clients.
//!
//! - `EmbeddingClient`: text to fixed-length vector, batch or single query
//! - `GeminiEmbeddings`: Google Generative Language API implementation

mod gemini;
mod provider;

pub use gemini::GeminiEmbeddings;
pub use provider::{Embedding, EmbeddingClient};
