use rayon::prelude::*;

use crate::common::constants::{
    MAX_WEIGHT_PERCENT, MIDPOINT_DECIMALS, OPEN_CLOSE_HITS, PARALLEL_THRESHOLD,
    SELECTION_DIVISOR, WICK_HITS, WICK_VOLUME_DIVISOR,
};
use crate::historical::structs::Candle;
use super::errors::VolumeProfileError;
use super::precision::{bin_position, round_half_away, round_to_decimals, rounded_percentage};
use super::structs::{Bin, BinGrid, PriceRange, ProfileOptions, VolumeProfile};

/// Compute the significant price levels of `candles` over `bin_count` bins.
pub fn compute_volume_profile(candles: &[Candle], bin_count: usize) -> Result<VolumeProfile, VolumeProfileError> {
    compute_with_options(candles, &ProfileOptions::with_bin_count(bin_count))
}

/// Run range estimation, bucketing, aggregation, scoring and selection in order.
pub fn compute_with_options(candles: &[Candle], options: &ProfileOptions) -> Result<VolumeProfile, VolumeProfileError> {
    if options.strict {
        validate_candles(candles)?;
    }

    let range = estimate_price_range(candles)?;
    let (grid, mut bins) = bucketize(&range, options.bin_count)?;
    let total_volume = aggregate(&mut bins, &grid, candles);
    let top_score = score_bins(&mut bins, total_volume);
    let levels = select_significant(&bins, top_score);

    Ok(VolumeProfile {
        levels,
        bins,
        range,
        step: grid.step,
        total_volume,
        top_score,
        candle_count: candles.len(),
    })
}

/// Smallest and largest OHLC value across all candles.
pub fn estimate_price_range(candles: &[Candle]) -> Result<PriceRange, VolumeProfileError> {
    if candles.is_empty() {
        return Err(VolumeProfileError::EmptyInput);
    }

    if candles.len() >= PARALLEL_THRESHOLD {
        return candles
            .par_iter()
            .enumerate()
            .map(|(index, candle)| candle_range(index, candle))
            .try_reduce_with(|a, b| Ok(a.merge(b)))
            .unwrap_or(Err(VolumeProfileError::EmptyInput));
    }

    let mut range = candle_range(0, &candles[0])?;
    for (index, candle) in candles.iter().enumerate().skip(1) {
        range = range.merge(candle_range(index, candle)?);
    }
    Ok(range)
}

fn candle_range(index: usize, candle: &Candle) -> Result<PriceRange, VolumeProfileError> {
    if candle.prices().iter().any(|price| !price.is_finite()) {
        return Err(VolumeProfileError::InvalidRange(format!(
            "candle {} at {} has a non-finite price (o={}, h={}, l={}, c={})",
            index, candle.timestamp, candle.open, candle.high, candle.low, candle.close
        )));
    }
    Ok(PriceRange::new(candle.min_price(), candle.max_price()))
}

/// Split `range` into `bin_count` equal-width bins with rounded midpoints.
pub fn bucketize(range: &PriceRange, bin_count: usize) -> Result<(BinGrid, Vec<Bin>), VolumeProfileError> {
    if bin_count == 0 {
        return Err(VolumeProfileError::InvalidBinCount(bin_count));
    }

    let step = range.span() / bin_count as f64;
    let grid = BinGrid {
        floor: range.min,
        step,
        bin_count,
    };

    let bins = (0..bin_count)
        .map(|index| {
            let midpoint = round_to_decimals(range.min + (index as f64 * step + step / 2.0), MIDPOINT_DECIMALS);
            Bin::new(index, midpoint)
        })
        .collect();

    Ok((grid, bins))
}

impl BinGrid {
    /// Rounded 1-based offset of `price` above the floor. Not clamped.
    pub fn position(&self, price: f64) -> i64 {
        if self.step == 0.0 {
            return 0;
        }
        bin_position(price, self.floor, self.step)
    }

    /// Bin index a price contributes to, if any.
    ///
    /// Positions at or below zero fall on the floor and are skipped. A zero
    /// step sends every price to bin 0. Positions past the top edge land in
    /// the last bin.
    pub fn slot(&self, price: f64) -> Option<usize> {
        if self.step == 0.0 {
            return Some(0);
        }
        let position = self.position(price);
        if position <= 0 {
            return None;
        }
        Some(position.min(self.bin_count as i64) as usize - 1)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BinTally {
    hits: u64,
    volume: f64,
}

/// Per-bin accumulators for one pass (or one rayon split) over the candles.
#[derive(Debug, Clone)]
struct Tally {
    bins: Vec<BinTally>,
    total_volume: f64,
}

impl Tally {
    fn new(bin_count: usize) -> Self {
        Self {
            bins: vec![BinTally::default(); bin_count],
            total_volume: 0.0,
        }
    }

    fn add_candle(mut self, grid: &BinGrid, candle: &Candle) -> Self {
        let full_volume = round_half_away(candle.volume);
        let wick_volume = round_half_away(candle.volume / WICK_VOLUME_DIVISOR);

        self.total_volume += full_volume;

        let touches = [
            (candle.open, OPEN_CLOSE_HITS, full_volume),
            (candle.high, WICK_HITS, wick_volume),
            (candle.low, WICK_HITS, wick_volume),
            (candle.close, OPEN_CLOSE_HITS, full_volume),
        ];
        for (price, hits, volume) in touches {
            if let Some(tally) = grid.slot(price).and_then(|slot| self.bins.get_mut(slot)) {
                tally.hits += hits;
                tally.volume += volume;
            }
        }
        self
    }

    fn merge(mut self, other: Tally) -> Self {
        for (mine, theirs) in self.bins.iter_mut().zip(other.bins) {
            mine.hits += theirs.hits;
            mine.volume += theirs.volume;
        }
        self.total_volume += other.total_volume;
        self
    }
}

/// Accumulate hits and volume into `bins`; returns the total traded volume
/// (sum of per-candle rounded volume).
///
/// `bins` should be the table `bucketize` built alongside `grid`. Slots past
/// the end of a shorter table are skipped.
pub fn aggregate(bins: &mut [Bin], grid: &BinGrid, candles: &[Candle]) -> f64 {
    let bin_count = bins.len();
    let tally = if candles.len() >= PARALLEL_THRESHOLD {
        candles
            .par_iter()
            .fold(|| Tally::new(bin_count), |tally, candle| tally.add_candle(grid, candle))
            .reduce(|| Tally::new(bin_count), Tally::merge)
    } else {
        candles
            .iter()
            .fold(Tally::new(bin_count), |tally, candle| tally.add_candle(grid, candle))
    };

    for (bin, counted) in bins.iter_mut().zip(&tally.bins) {
        bin.hits += counted.hits;
        bin.volume += counted.volume;
    }
    tally.total_volume
}

/// Set each bin's weight and score; returns the top score.
pub fn score_bins(bins: &mut [Bin], total_volume: f64) -> f64 {
    let mut top_score = 0.0;
    for bin in bins.iter_mut() {
        bin.weight = rounded_percentage(bin.volume, total_volume).clamp(0.0, MAX_WEIGHT_PERCENT);
        bin.score = bin.hits as f64 * bin.weight;
        if bin.score > top_score {
            top_score = bin.score;
        }
    }
    top_score
}

/// Bins with `score > top_score / 4`, in index order.
pub fn select_significant(bins: &[Bin], top_score: f64) -> Vec<Bin> {
    let threshold = top_score / SELECTION_DIVISOR;
    bins.iter().filter(|bin| bin.score > threshold).cloned().collect()
}

/// Reject candles a strict caller does not want profiled.
pub fn validate_candles(candles: &[Candle]) -> Result<(), VolumeProfileError> {
    for (index, candle) in candles.iter().enumerate() {
        let invalid = |reason: &str| -> Result<(), VolumeProfileError> {
            Err(VolumeProfileError::InvalidRange(format!(
                "candle {} at {}: {}",
                index, candle.timestamp, reason
            )))
        };

        if candle.prices().iter().any(|price| !price.is_finite() || *price <= 0.0) {
            return invalid("prices must be finite and positive");
        }
        if !candle.volume.is_finite() || candle.volume < 0.0 {
            return invalid("volume must be finite and non-negative");
        }
        if candle.low > candle.open.min(candle.close) || candle.high < candle.open.max(candle.close) {
            return invalid("expected low <= open, close <= high");
        }
    }
    Ok(())
}
