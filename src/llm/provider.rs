use async_trait::async_trait;

use super::types::ChatMessage;
use crate::core::errors::ApiError;

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// model name, used in logs
    fn name(&self) -> &str;

    /// chat completion (non-streaming), returns the raw completion text
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, ApiError>;
}
