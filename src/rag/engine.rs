//! Suggestion pipeline: retrieve, build context, prompt, parse, truncate.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::context_builder::format_context;
use super::error::RagError;
use super::parser::parse_recommendations;
use super::prompt::render_prompt;
use super::store::{ItemVectorStore, DEFAULT_INCLUDE_TYPES};
use crate::core::config::RagSettings;
use crate::core::config::defaults;
use crate::llm::{ChatMessage, ChatModel};
use crate::models::{ItemType, Recommendation, SuggestionRequest};

/// Configuration for the suggestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Matches retrieved per request, independent of `maxItems`
    pub top_k: usize,
    /// Item types eligible for retrieval
    pub include_types: Vec<ItemType>,
    /// Drop recommendations whose id was not in the retrieved context
    pub restrict_to_context: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::RAG_TOP_K,
            include_types: DEFAULT_INCLUDE_TYPES.to_vec(),
            restrict_to_context: false,
        }
    }
}

impl From<&RagSettings> for RagConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            top_k: settings.top_k,
            restrict_to_context: settings.restrict_to_context,
            ..Self::default()
        }
    }
}

pub struct RagEngine {
    store: Arc<ItemVectorStore>,
    chat: Arc<dyn ChatModel>,
    config: RagConfig,
}

impl RagEngine {
    pub fn new(store: Arc<ItemVectorStore>, chat: Arc<dyn ChatModel>, config: RagConfig) -> Self {
        Self {
            store,
            chat,
            config,
        }
    }

    /// Sends the rendered prompt to the chat model. No retry or timeout at this layer.
    pub async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, RagError> {
        Ok(self.chat.invoke(messages).await?)
    }

    /// Returns at most `request.max_items` recommendations for the user's open items.
    pub async fn suggest_top3(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<Recommendation>, RagError> {
        let question = request.effective_question();
        if let Some(window) = request.time_window.as_deref() {
            tracing::debug!("Suggestion time window hint: {}", window);
        }

        let matches = self
            .store
            .query(
                &request.user_id,
                question,
                self.config.top_k,
                &self.config.include_types,
            )
            .await?;
        tracing::info!(
            "Retrieved {} open items for user {}",
            matches.len(),
            request.user_id
        );

        let context = format_context(&matches);
        let messages = render_prompt(&context, question, request.limit());
        let completion = self.invoke(&messages).await?;

        let mut recommendations = parse_recommendations(&completion)?;

        let known: HashSet<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        let unknown = recommendations
            .iter()
            .filter(|r| !known.contains(r.item_id.as_str()))
            .count();
        if unknown > 0 {
            tracing::warn!(
                "Model referenced {} item ids outside the retrieved context (model: {})",
                unknown,
                self.chat.name()
            );
            if self.config.restrict_to_context {
                recommendations.retain(|r| known.contains(r.item_id.as_str()));
            }
        }

        recommendations.truncate(request.limit());
        tracing::info!("Returning {} recommendations", recommendations.len());
        Ok(recommendations)
    }
}
