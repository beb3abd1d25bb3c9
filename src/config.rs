use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the wikirag server.
#[derive(Debug)]
pub struct Config {
    /// Base URL of the Ollama runtime serving embeddings and generation.
    pub ollama_url: String,
    /// Embedding model identifier passed to the runtime.
    pub embedding_model: String,
    /// Generation model identifier passed to the runtime.
    pub generation_model: String,
    /// Root directory of the on-disk vector index.
    pub index_dir: PathBuf,
    /// Name of the collection holding the corpus vectors.
    pub collection_name: String,
    /// Chunk window size in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunk windows in characters.
    pub chunk_overlap: usize,
    /// Directory holding the curated PDF corpus.
    pub pdf_dir: PathBuf,
    /// Directory holding user-uploaded PDFs.
    pub upload_dir: PathBuf,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Optional log file appended to in addition to stdout.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let chunk_size = load_env_optional("CHUNK_SIZE")
            .map(|value| parse_usize("CHUNK_SIZE", &value))
            .transpose()?
            .unwrap_or(1000);
        let chunk_overlap = load_env_optional("CHUNK_OVERLAP")
            .map(|value| parse_usize("CHUNK_OVERLAP", &value))
            .transpose()?
            .unwrap_or(150);

        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue(
                "CHUNK_SIZE must be at least 1".to_string(),
            ));
        }
        // The chunker clamps its advance step instead of re-checking this,
        // so the overlap invariant has to hold here.
        if chunk_overlap >= chunk_size {
            return Err(ConfigError::InvalidValue(
                "CHUNK_OVERLAP must be smaller than CHUNK_SIZE".to_string(),
            ));
        }

        Ok(Self {
            ollama_url: load_env_optional("OLLAMA_URL")
                .unwrap_or_else(|| "http://127.0.0.1:11434".to_string()),
            embedding_model: load_env_optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| "nomic-embed-text".to_string()),
            generation_model: load_env_optional("GENERATION_MODEL")
                .unwrap_or_else(|| "llama3.2:3b-instruct-q4_K_M".to_string()),
            index_dir: load_env_optional("INDEX_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./db")),
            collection_name: load_env_optional("COLLECTION_NAME")
                .unwrap_or_else(|| "wiki_pdf".to_string()),
            chunk_size,
            chunk_overlap,
            pdf_dir: load_env_optional("PDF_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data/pdfs")),
            upload_dir: load_env_optional("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./uploads")),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            log_file: load_env_optional("LOG_FILE").map(PathBuf::from),
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        ollama_url = %config.ollama_url,
        collection = %config.collection_name,
        index_dir = %config.index_dir.display(),
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_reference_deployment() {
        let config = Config::from_env().expect("config");
        assert_eq!(config.collection_name, "wiki_pdf");
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 150);
        assert!(config.chunk_overlap < config.chunk_size);
        assert!(config.log_file.is_none());
    }
}
