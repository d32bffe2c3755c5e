use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("quote error: {0}")]
    Quote(String),

    #[error("insufficient data: requested {requested} samples, {available} available")]
    InsufficientData { requested: usize, available: usize },

    #[error("trial expired: {elapsed_hours}h elapsed of {limit_hours}h")]
    TrialExpired { elapsed_hours: i64, limit_hours: i64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
