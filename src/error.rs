use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Not enough data to summarize: the series is empty")]
    InsufficientData,

    #[error("Metric '{0}' is undefined for this series")]
    UndefinedMetric(&'static str),

    #[error("Failed to read series source: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SeriesError>;
