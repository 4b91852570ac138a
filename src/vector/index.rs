use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::errors::ApiError;

pub type Metadata = Map<String, Value>;

/// A stored `(id, vector, metadata)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A nearest-neighbour hit. Higher `score` means more relevant; the scale is backend-defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite records keyed by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), ApiError>;

    /// Delete records by id. Unknown ids are not an error.
    async fn delete(&self, ids: &[String]) -> Result<(), ApiError>;

    /// Nearest neighbours of `vector` passing `filter`, most relevant first, at most `top_k`.
    ///
    /// `filter` uses the Pinecone metadata filter language (`$eq`, `$in`, ...).
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&Value>,
    ) -> Result<Vec<QueryMatch>, ApiError>;
}
