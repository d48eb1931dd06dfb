use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::historical::structs::TimestampMS;

/// Supported API endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiEndpoint {
    /// Kline/Candlestick data
    Klines,
    /// Exchange info (symbol list)
    ExchangeInfo,
}

impl ApiEndpoint {
    /// Get the Binance spot REST path for this endpoint
    pub fn binance_path(&self) -> &'static str {
        match self {
            ApiEndpoint::Klines => crate::common::constants::BINANCE_KLINES_PATH,
            ApiEndpoint::ExchangeInfo => crate::common::constants::BINANCE_EXCHANGE_INFO_PATH,
        }
    }
}

/// Candle request for one instrument and timeframe
#[derive(Debug, Clone, PartialEq)]
pub struct KlinesRequest {
    pub symbol: String,
    pub interval: String,
    pub start_time: Option<TimestampMS>,
    pub end_time: Option<TimestampMS>,
    pub limit: Option<u32>,
}

impl KlinesRequest {
    pub fn new(symbol: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            start_time: None,
            end_time: None,
            limit: None,
        }
    }

    pub fn with_time_range(mut self, start_time: TimestampMS, end_time: TimestampMS) -> Self {
        self.start_time = Some(start_time);
        self.end_time = Some(end_time);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Rate limiting information from API headers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub requests_used: u32,
    pub requests_limit: u32,
    pub retry_after: Option<u32>,
}

/// API error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl ApiError {
    /// Transient failures worth one more attempt
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Http(_) | ApiError::RateLimit(_))
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ApiError::RateLimit(_))
    }
}

/// API statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiStats {
    pub requests_made: u64,
    pub requests_successful: u64,
    pub requests_failed: u64,
    pub rate_limit_hits: u64,
    pub total_candles_fetched: u64,
    pub last_request_time: Option<TimestampMS>,
}

impl ApiStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&mut self) {
        self.requests_made += 1;
        self.last_request_time = Some(chrono::Utc::now().timestamp_millis());
    }

    pub fn record_success(&mut self, candles_count: u64) {
        self.requests_successful += 1;
        self.total_candles_fetched += candles_count;
    }

    pub fn record_failure(&mut self) {
        self.requests_failed += 1;
    }

    pub fn record_rate_limit(&mut self) {
        self.rate_limit_hits += 1;
        self.record_failure();
    }

    pub fn success_rate(&self) -> f64 {
        if self.requests_made == 0 {
            0.0
        } else {
            self.requests_successful as f64 / self.requests_made as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_klines_request_builder() {
        let request = KlinesRequest::new("BTCUSDT", "1h")
            .with_time_range(1640995200000, 1641081600000)
            .with_limit(500);
        assert_eq!(request.symbol, "BTCUSDT");
        assert_eq!(request.interval, "1h");
        assert_eq!(request.start_time, Some(1640995200000));
        assert_eq!(request.end_time, Some(1641081600000));
        assert_eq!(request.limit, Some(500));
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(ApiEndpoint::Klines.binance_path(), "/api/v3/klines");
        assert_eq!(ApiEndpoint::ExchangeInfo.binance_path(), "/api/v3/exchangeInfo");
    }

    #[test]
    fn test_api_error_classification() {
        assert!(ApiError::Network("reset".to_string()).is_recoverable());
        assert!(ApiError::RateLimit("429".to_string()).is_rate_limit());
        assert!(!ApiError::InvalidSymbol("FOO".to_string()).is_recoverable());
        assert!(!ApiError::Parse("bad".to_string()).is_rate_limit());
    }

    #[test]
    fn test_api_stats() {
        let mut stats = ApiStats::new();
        assert_eq!(stats.success_rate(), 0.0);

        stats.record_request();
        stats.record_success(500);
        stats.record_request();
        stats.record_rate_limit();

        assert_eq!(stats.requests_made, 2);
        assert_eq!(stats.total_candles_fetched, 500);
        assert_eq!(stats.rate_limit_hits, 1);
        assert_eq!(stats.requests_failed, 1);
        assert_eq!(stats.success_rate(), 0.5);
        assert!(stats.last_request_time.is_some());
    }
}
