use thiserror::Error;

use crate::core::errors::ApiError;

#[derive(Debug, Error)]
pub enum RagError {
    /// The completion held no parseable JSON object.
    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    /// An embedding, index or chat collaborator failed; passed through unchanged.
    #[error(transparent)]
    Collaborator(#[from] ApiError),
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::MalformedOutput(msg) => ApiError::MalformedOutput(msg),
            RagError::Collaborator(inner) => inner,
        }
    }
}
