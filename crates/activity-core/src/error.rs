use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActivityError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Empty group: no records for {group}")]
    EmptyGroup { group: String },

    #[error("Unknown {field} value: {value:?}")]
    UnknownVocabulary { field: &'static str, value: String },

    #[error("Invalid divisor: {divisor} is zero")]
    InvalidDivisor { divisor: &'static str },

    #[error("Invalid row at line {line}: {message}")]
    InvalidRow { line: u64, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ActivityError {
    /// True for failures caused by the data itself rather than the environment.
    /// The HTTP layer answers these with 422.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyGroup { .. } | Self::UnknownVocabulary { .. } | Self::InvalidDivisor { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ActivityError>;
