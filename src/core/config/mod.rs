pub mod defaults;
pub mod settings;
pub mod validation;

pub use settings::{
    ConfigError, GoogleSettings, PineconeSettings, RagSettings, ServerSettings, Settings,
    VectorBackend,
};
