use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaarifaError {
    #[error("Already initialized. Remove .taarifa/ to reinitialize.")]
    AlreadyInitialized,

    #[error("{0}")]
    Validation(String),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Confirmation required: {0}")]
    Confirmation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, TaarifaError>;
