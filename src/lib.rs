//! Volume profile levels for OHLCV candle sequences.
//!
//! [`volume_profile::compute_volume_profile`] is the pure core; the other
//! modules retrieve candles, configure, log and present results around it.

pub mod api;
pub mod common;
pub mod config;
pub mod errors;
pub mod historical;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod volume_profile;

pub use errors::AppError;
pub use historical::structs::Candle;
pub use volume_profile::{compute_volume_profile, compute_with_options, Bin, PriceRange, ProfileOptions, VolumeProfile, VolumeProfileError};
