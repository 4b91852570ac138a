use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::provider::{Embedding, EmbeddingClient};
use crate::core::errors::ApiError;
use crate::llm::gemini::GEMINI_BASE_URL;

#[derive(Clone)]
pub struct GeminiEmbeddings {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiEmbeddings {
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn model_path(&self) -> String {
        format!("models/{}", self.model)
    }
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: ContentEmbedding,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingClient for GeminiEmbeddings {
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>, ApiError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let url = format!("{}/{}:batchEmbedContents", self.base_url, self.model_path());
        let requests: Vec<_> = texts
            .iter()
            .map(|text| {
                json!({
                    "model": self.model_path(),
                    "content": { "parts": [{ "text": text }] },
                    "taskType": "RETRIEVAL_DOCUMENT",
                })
            })
            .collect();

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({ "requests": requests }))
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "Gemini embedding error ({}): {}",
                status, text
            )));
        }

        let payload: BatchEmbedResponse = res.json().await.map_err(ApiError::upstream)?;
        if payload.embeddings.len() != texts.len() {
            return Err(ApiError::Upstream(format!(
                "Gemini returned {} embeddings for {} inputs",
                payload.embeddings.len(),
                texts.len()
            )));
        }

        Ok(payload.embeddings.into_iter().map(|e| e.values).collect())
    }

    async fn embed_one(&self, text: &str) -> Result<Embedding, ApiError> {
        let url = format!("{}/{}:embedContent", self.base_url, self.model_path());
        let body = json!({
            "model": self.model_path(),
            "content": { "parts": [{ "text": text }] },
            "taskType": "RETRIEVAL_QUERY",
        });

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "Gemini embedding error ({}): {}",
                status, text
            )));
        }

        let payload: EmbedResponse = res.json().await.map_err(ApiError::upstream)?;
        Ok(payload.embedding.values)
    }
}
