use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum AppError {
    #[error("TOML config file error: {0}")]
    TomlConfig(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON record error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image loading failed: {0}")]
    ImageLoad(String),

    #[error("Image saving failed: {0}")]
    ImageSave(String),

    #[error("Similarity computation failed: {0}")]
    Similarity(String),

    #[error("DDS codec error: {0}")]
    Dds(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type with default AppError
pub type Result<T, E = AppError> = std::result::Result<T, E>;
