use super::settings::{ConfigError, Settings, VectorBackend};

pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    validate_required(&settings.api_key, "api_key")?;
    validate_required(&settings.google.api_key, "google.api_key")?;
    validate_required(&settings.google.embedding_model, "google.embedding_model")?;
    validate_required(&settings.google.chat_model, "google.chat_model")?;

    if settings.vector_backend == VectorBackend::Pinecone {
        validate_required(&settings.pinecone.api_key, "pinecone.api_key")?;
        validate_required(&settings.pinecone.index_name, "pinecone.index_name")?;
    }

    validate_f64_range(settings.google.temperature, "google.temperature", 0.0, 2.0)?;
    validate_usize_range(settings.rag.top_k, "rag.top_k", 1, 100)?;
    validate_u64_range(settings.http_timeout_secs, "http_timeout_secs", 1, 3_600)?;

    Ok(())
}

fn validate_required(value: &str, path: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(path, "value is required"));
    }
    Ok(())
}

fn validate_f64_range(value: f64, path: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    if !(min..=max).contains(&value) {
        return Err(range_error(path, min, max));
    }
    Ok(())
}

fn validate_usize_range(value: usize, path: &str, min: usize, max: usize) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(range_error(path, min, max));
    }
    Ok(())
}

fn validate_u64_range(value: u64, path: &str, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(range_error(path, min, max));
    }
    Ok(())
}

fn range_error<T: std::fmt::Display>(path: &str, min: T, max: T) -> ConfigError {
    ConfigError::invalid(path, format!("must be between {} and {}", min, max))
}
