//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `ItemVectorStore`: embeds items into the vector index and retrieves open ones
//! - `format_context` / `render_prompt`: turn matches into a model prompt
//! - `parse_recommendations`: lenient recovery of structured output
//! - `RagEngine`: the end-to-end "top actions today" pipeline

mod context_builder;
mod engine;
mod error;
mod parser;
mod prompt;
mod store;

pub use context_builder::{format_context, NO_OPEN_ACTIONS};
pub use engine::{RagConfig, RagEngine};
pub use error::RagError;
pub use parser::{extract_json_block, parse_recommendations};
pub use prompt::render_prompt;
pub use store::{
    build_item_metadata, build_item_text, build_query_filter, ItemVectorStore, RetrievedMatch,
    DEFAULT_INCLUDE_TYPES,
};
