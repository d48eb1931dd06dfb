/// Volume Profile Module
///
/// Partitions the traded price range of a candle sequence into equal-width
/// bins, scores each bin from weighted OHLC touches and volume, and keeps the
/// bins that score above a quarter of the strongest one.
pub mod calculator;
pub mod errors;
pub mod precision;
pub mod structs;

pub use calculator::{
    aggregate, bucketize, compute_volume_profile, compute_with_options, estimate_price_range,
    score_bins, select_significant, validate_candles,
};
pub use errors::VolumeProfileError;
pub use structs::{Bin, BinGrid, PriceRange, ProfileOptions, VolumeProfile};
