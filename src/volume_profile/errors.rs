use thiserror::Error;

/// Failures of a single profile computation. Nothing partial is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VolumeProfileError {
    #[error("Empty input: at least one candle is required to establish a price range")]
    EmptyInput,
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Invalid bin count: {0} (must be at least 1)")]
    InvalidBinCount(usize),
}
