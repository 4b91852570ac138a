//! Pinecone data-plane client over REST.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::index::{QueryMatch, VectorIndex, VectorRecord};
use crate::core::errors::ApiError;

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2024-07";

#[derive(Clone)]
pub struct PineconeIndex {
    host: String,
    api_key: String,
    client: Client,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

impl PineconeIndex {
    /// Connects to an index whose data-plane host is already known.
    pub fn new(client: Client, api_key: impl Into<String>, host: &str) -> Self {
        Self {
            host: normalize_host(host),
            api_key: api_key.into(),
            client,
        }
    }

    /// Resolves the data-plane host for `index_name` unless `host` is given.
    pub async fn connect(
        client: Client,
        api_key: &str,
        index_name: &str,
        host: Option<&str>,
    ) -> Result<Self, ApiError> {
        Self::connect_via(CONTROL_PLANE_URL, client, api_key, index_name, host).await
    }

    /// Like [`PineconeIndex::connect`], against an explicit control-plane URL.
    pub async fn connect_via(
        control_plane_url: &str,
        client: Client,
        api_key: &str,
        index_name: &str,
        host: Option<&str>,
    ) -> Result<Self, ApiError> {
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            return Ok(Self::new(client, api_key, host));
        }

        let url = format!(
            "{}/indexes/{}",
            control_plane_url.trim_end_matches('/'),
            index_name
        );
        let res = client
            .get(&url)
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "Failed to describe Pinecone index '{}' ({}): {}",
                index_name, status, text
            )));
        }

        let described: DescribeIndexResponse = res.json().await.map_err(ApiError::upstream)?;
        tracing::info!("Resolved Pinecone index '{}' to {}", index_name, described.host);
        Ok(Self::new(client, api_key, &described.host))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.host, path);
        let res = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "Pinecone {} error ({}): {}",
                path, status, text
            )));
        }

        Ok(res)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), ApiError> {
        if records.is_empty() {
            return Ok(());
        }
        self.post("/vectors/upsert", &json!({ "vectors": records }))
            .await?;
        Ok(())
    }

    async fn delete(&self, ids: &[String]) -> Result<(), ApiError> {
        if ids.is_empty() {
            return Ok(());
        }
        // Pinecone treats unknown ids as a successful no-op.
        self.post("/vectors/delete", &json!({ "ids": ids })).await?;
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&Value>,
    ) -> Result<Vec<QueryMatch>, ApiError> {
        let mut body = json!({
            "vector": vector,
            "topK": top_k,
            "includeValues": false,
            "includeMetadata": true,
        });
        if let (Some(filter), Some(obj)) = (filter, body.as_object_mut()) {
            obj.insert("filter".to_string(), filter.clone());
        }

        let res = self.post("/query", &body).await?;
        let payload: QueryResponse = res.json().await.map_err(ApiError::upstream)?;
        Ok(payload.matches)
    }
}
