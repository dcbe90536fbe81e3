use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TrendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Board API returned unusable data from {endpoint}: {reason}")]
    Api { endpoint: String, reason: String },

    #[error("Card '{card}' has a remaining value that is not a number: {value}")]
    InvalidNumber { card: String, value: String },

    #[error("Weekly decrement must be a positive number of days, got {0}")]
    InvalidDecrement(i64),

    #[error("No trend points found in {}", .0.display())]
    EmptyHistory(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, TrendError>;
