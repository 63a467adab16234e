use thiserror::Error;

#[derive(Error, Debug)]
pub enum SleepScoreError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),
}

pub type SsResult<T> = Result<T, SleepScoreError>;

/// Per-rule failure inside the engine. Never returned to callers: the engine
/// logs it and substitutes the rule's neutral value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleFailure {
    #[error("unresolved {0}")]
    Resolution(String),

    #[error("arithmetic failure: {0}")]
    Arithmetic(String),
}
