pub mod gemini;
pub mod provider;
pub mod types;

pub use gemini::GeminiChat;
pub use provider::ChatModel;
pub use types::{ChatMessage, Role};
