use thiserror::Error;

use crate::api::types::ApiError;
use crate::config::ConfigError;
use crate::volume_profile::errors::VolumeProfileError;

/// Top-level error for a CLI run
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Candle retrieval failed: {0}")]
    Api(#[from] ApiError),
    #[error("Volume profile failed: {0}")]
    Profile(#[from] VolumeProfileError),
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}
