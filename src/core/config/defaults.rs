pub const CONFIG_PATH_ENV: &str = "TRACTION_BRAIN_CONFIG_PATH";
pub const CONFIG_FILE_NAME: &str = "config.yml";

pub const HOST: &str = "0.0.0.0";
pub const PORT: u16 = 8000;

pub const EMBEDDING_MODEL: &str = "text-embedding-004";
pub const CHAT_MODEL: &str = "gemini-1.5-pro";
pub const CHAT_TEMPERATURE: f64 = 0.3;

pub const RAG_TOP_K: usize = 20;
pub const HTTP_TIMEOUT_SECS: u64 = 60;
