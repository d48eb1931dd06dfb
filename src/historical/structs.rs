use serde::{Deserialize, Serialize};

pub type TimestampMS = i64;
pub type Seconds = u64;

/// One OHLCV bar as delivered by a market-data source.
///
/// `low <= {open, close} <= high` is expected but not enforced here; strict
/// profile options validate it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: TimestampMS,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: TimestampMS, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Open, high, low, close in that order.
    pub fn prices(&self) -> [f64; 4] {
        [self.open, self.high, self.low, self.close]
    }

    pub fn min_price(&self) -> f64 {
        self.prices().into_iter().fold(f64::INFINITY, f64::min)
    }

    pub fn max_price(&self) -> f64 {
        self.prices().into_iter().fold(f64::NEG_INFINITY, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: TimestampMS,
    pub end: TimestampMS,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_price_extremes() {
        let candle = Candle::new(1640995200000, 10.0, 12.0, 9.0, 11.0, 100.0);
        assert_eq!(candle.prices(), [10.0, 12.0, 9.0, 11.0]);
        assert_eq!(candle.min_price(), 9.0);
        assert_eq!(candle.max_price(), 12.0);
    }

    #[test]
    fn test_malformed_candle_extremes_use_every_field() {
        // open above high still counts as the maximum
        let candle = Candle::new(0, 15.0, 12.0, 9.0, 8.5, 1.0);
        assert_eq!(candle.min_price(), 8.5);
        assert_eq!(candle.max_price(), 15.0);
    }
}
