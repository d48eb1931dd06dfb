use serde::{Deserialize, Serialize};

use crate::common::constants::DEFAULT_BIN_COUNT;

/// Lowest and highest price touched by any OHLC field of the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Widen to cover `other`.
    pub fn merge(self, other: PriceRange) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Equal-width partition of a [`PriceRange`] into `bin_count` bins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinGrid {
    pub floor: f64,
    pub step: f64,
    pub bin_count: usize,
}

/// One equal-width price bin and its accumulators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub index: usize,
    /// Center of the bin's price interval, rounded to 6 decimals
    pub midpoint: f64,
    pub hits: u64,
    /// Integer-valued sum of rounded volume contributions
    pub volume: f64,
    /// Integer percentage of total traded volume, 0-100
    pub weight: f64,
    /// hits * weight
    pub score: f64,
}

impl Bin {
    pub fn new(index: usize, midpoint: f64) -> Self {
        Self {
            index,
            midpoint,
            hits: 0,
            volume: 0.0,
            weight: 0.0,
            score: 0.0,
        }
    }
}

/// Tunables for a profile computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOptions {
    pub bin_count: usize,
    /// Reject non-positive prices, negative volume and OHLC ordering violations
    pub strict: bool,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            bin_count: DEFAULT_BIN_COUNT,
            strict: false,
        }
    }
}

impl ProfileOptions {
    pub fn with_bin_count(bin_count: usize) -> Self {
        Self {
            bin_count,
            ..Default::default()
        }
    }
}

/// Result of one profile computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    /// Bins scoring above a quarter of the top score, in index order
    pub levels: Vec<Bin>,
    /// Every scored bin, including the ones not selected
    pub bins: Vec<Bin>,
    pub range: PriceRange,
    pub step: f64,
    pub total_volume: f64,
    pub top_score: f64,
    pub candle_count: usize,
}

impl VolumeProfile {
    /// Selected level with the highest score; the lowest index wins ties.
    pub fn strongest_level(&self) -> Option<&Bin> {
        self.levels.iter().fold(None, |best: Option<&Bin>, bin| match best {
            Some(current) if current.score >= bin.score => Some(current),
            _ => Some(bin),
        })
    }

    /// Midpoints of the selected levels.
    pub fn level_prices(&self) -> Vec<f64> {
        self.levels.iter().map(|bin| bin.midpoint).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_merge() {
        let range = PriceRange::new(10.0, 12.0).merge(PriceRange::new(9.0, 11.0));
        assert_eq!(range, PriceRange::new(9.0, 12.0));
        assert_eq!(range.span(), 3.0);
        assert!(!range.is_degenerate());
        assert!(range.contains(9.0));
        assert!(range.contains(12.0));
        assert!(!range.contains(12.5));
    }

    #[test]
    fn test_profile_options_default() {
        let options = ProfileOptions::default();
        assert_eq!(options.bin_count, 100);
        assert!(!options.strict);
        assert_eq!(ProfileOptions::with_bin_count(3).bin_count, 3);
    }

    #[test]
    fn test_profile_options_deserialize_partial() {
        let options: ProfileOptions = toml::from_str("strict = true").unwrap();
        assert_eq!(options.bin_count, 100);
        assert!(options.strict);
    }

    #[test]
    fn test_strongest_level_prefers_lowest_index_on_tie() {
        let mut first = Bin::new(0, 9.5);
        first.score = 700.0;
        let mut second = Bin::new(1, 10.5);
        second.score = 700.0;
        let profile = VolumeProfile {
            levels: vec![first.clone(), second],
            bins: Vec::new(),
            range: PriceRange::new(9.0, 12.0),
            step: 1.0,
            total_volume: 150.0,
            top_score: 700.0,
            candle_count: 2,
        };
        assert_eq!(profile.strongest_level(), Some(&first));
        assert_eq!(profile.level_prices(), vec![9.5, 10.5]);
    }
}
