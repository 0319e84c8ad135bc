use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Cannot infer output format from {path}; pass --format")]
    UnknownOutputFormat { path: String },

    #[error("Failed to serialize plan: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] ageshift::Error),
}
