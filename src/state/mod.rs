use std::sync::Arc;

use crate::core::config::{Settings, VectorBackend};
use crate::core::security::ApiKey;
use crate::embeddings::{EmbeddingClient, GeminiEmbeddings};
use crate::llm::{ChatModel, GeminiChat};
use crate::rag::{ItemVectorStore, RagConfig, RagEngine};
use crate::vector::{InMemoryIndex, PineconeIndex, VectorIndex};

pub mod error;

use error::InitializationError;

/// Application state shared across all routes.
///
/// The collaborator clients are built once here and reused by every request.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub api_key: ApiKey,
    pub store: Arc<ItemVectorStore>,
    pub rag: Arc<RagEngine>,
}

impl AppState {
    /// Builds the Gemini and vector index clients described by `settings`.
    pub async fn initialize(settings: Settings) -> Result<Arc<Self>, InitializationError> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout())
            .build()
            .map_err(InitializationError::HttpClient)?;

        let embeddings = Arc::new(GeminiEmbeddings::new(
            http.clone(),
            &settings.google.api_key,
            &settings.google.embedding_model,
        ));
        let chat = Arc::new(GeminiChat::new(
            http.clone(),
            &settings.google.api_key,
            &settings.google.chat_model,
            settings.google.temperature,
        ));

        let index: Arc<dyn VectorIndex> = match settings.vector_backend {
            VectorBackend::Pinecone => Arc::new(
                PineconeIndex::connect(
                    http,
                    &settings.pinecone.api_key,
                    &settings.pinecone.index_name,
                    settings.pinecone.index_host.as_deref(),
                )
                .await
                .map_err(InitializationError::VectorIndex)?,
            ),
            VectorBackend::Memory => {
                tracing::warn!("Using in-memory vector index; items are lost on restart");
                Arc::new(InMemoryIndex::new())
            }
        };

        Ok(Self::from_components(settings, embeddings, index, chat))
    }

    /// Wires already-constructed collaborators into the state.
    pub fn from_components(
        settings: Settings,
        embeddings: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatModel>,
    ) -> Arc<Self> {
        let api_key = ApiKey::new(settings.api_key.clone());
        let store = Arc::new(ItemVectorStore::new(embeddings, index));
        let rag = Arc::new(RagEngine::new(
            store.clone(),
            chat,
            RagConfig::from(&settings.rag),
        ));

        Arc::new(AppState {
            settings: Arc::new(settings),
            api_key,
            store,
            rag,
        })
    }
}
