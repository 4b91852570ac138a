//! Vector index collaborators.
//!
//! - `VectorIndex`: upsert, delete-by-id and filtered nearest-neighbour query
//! - `PineconeIndex`: Pinecone data-plane REST client
//! - `InMemoryIndex`: process-local index for development and tests

mod index;
mod memory;
mod pinecone;

pub use index::{Metadata, QueryMatch, VectorIndex, VectorRecord};
pub use memory::InMemoryIndex;
pub use pinecone::PineconeIndex;
