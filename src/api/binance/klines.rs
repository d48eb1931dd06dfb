use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::api::exchange::CandleSource;
use crate::api::types::{ApiEndpoint, ApiError, ApiStats, KlinesRequest, RateLimitInfo};
use crate::common::constants::{
    BINANCE_MAX_KLINES_LIMIT, BINANCE_REQUEST_WEIGHT_LIMIT, DEFAULT_MIN_REQUEST_INTERVAL_MS, HTTP_TIMEOUT_SECS,
    SYMBOL_SUGGESTION_LIMIT,
};
use crate::historical::structs::{Candle, Seconds, TimestampMS};
use crate::historical::utils::interval_to_seconds;

/// Binance REST client for klines and symbol lookup
pub struct BinanceKlinesClient {
    client: reqwest::Client,
    base_url: String,
    last_request_time: Option<Instant>,
    min_request_interval: Duration,
    stats: ApiStats,
    rate_limit: Option<RateLimitInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeInfoResponse {
    symbols: Vec<ExchangeSymbol>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeSymbol {
    symbol: String,
    status: String,
}

impl BinanceKlinesClient {
    /// Create a new Binance klines client
    pub fn new(base_url: String) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            last_request_time: None,
            min_request_interval: Duration::from_millis(DEFAULT_MIN_REQUEST_INTERVAL_MS),
            stats: ApiStats::new(),
            rate_limit: None,
        })
    }

    /// Fetch klines data from Binance API
    pub async fn fetch_klines(&mut self, request: &KlinesRequest) -> Result<Vec<Candle>, ApiError> {
        validate_interval(&request.interval)?;

        let url = self.build_klines_url(request)?;
        let body = self.get(&url).await?;

        let raw_klines: Vec<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| ApiError::Parse(format!("Failed to parse JSON: {}", e)))?;

        let candles = self.parse_klines_response(raw_klines)?;
        self.stats.record_success(candles.len() as u64);

        info!("✅ Fetched {} klines for {} {}", candles.len(), request.symbol, request.interval);
        Ok(candles)
    }

    /// Symbols currently trading on the exchange
    pub async fn list_symbols(&mut self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}{}", self.base_url, ApiEndpoint::ExchangeInfo.binance_path());
        let body = self.get(&url).await?;
        let symbols = parse_exchange_info(&body)?;
        self.stats.record_success(0);

        debug!("Exchange info lists {} trading symbols", symbols.len());
        Ok(symbols)
    }

    /// Look up `query` against the exchange's symbol list
    pub async fn resolve_symbol(&mut self, query: &str) -> Result<String, ApiError> {
        let symbols = self.list_symbols().await?;
        match_symbol(query, &symbols)
    }

    /// Rate-limited GET returning the body; remembers the rate limit headers
    async fn get(&mut self, url: &str) -> Result<String, ApiError> {
        // Rate limiting: ensure minimum interval between requests
        if let Some(last_request) = self.last_request_time {
            let elapsed = last_request.elapsed();
            if elapsed < self.min_request_interval {
                let delay = self.min_request_interval - elapsed;
                debug!("Rate limiting: waiting {:?} before next request", delay);
                sleep(delay).await;
            }
        }

        debug!("GET {}", url);
        self.last_request_time = Some(Instant::now());
        self.stats.record_request();

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                self.stats.record_failure();
                return Err(ApiError::Network(format!("Request failed: {}", e)));
            }
        };

        if response.status().as_u16() == 429 {
            let retry_after = response.headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            self.stats.record_rate_limit();
            warn!("Binance rate limit hit, retry after {}s", retry_after);
            return Err(ApiError::RateLimit(format!("Rate limit exceeded, retry after {} seconds", retry_after)));
        }

        if !response.status().is_success() {
            self.stats.record_failure();
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Http(format!(
                "HTTP {}: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                detail.chars().take(200).collect::<String>()
            )));
        }

        if let Some(info) = parse_rate_limit_headers(response.headers()) {
            debug!("Request weight used: {}/{}", info.requests_used, info.requests_limit);
            self.rate_limit = Some(info);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to read response body: {}", e)))?;

        debug!("Received response body ({}b): {}", body.len(), body.chars().take(200).collect::<String>());
        Ok(body)
    }

    /// Build the complete URL for klines request
    fn build_klines_url(&self, request: &KlinesRequest) -> Result<String, ApiError> {
        if request.symbol.trim().is_empty() {
            return Err(ApiError::InvalidSymbol("symbol must not be empty".to_string()));
        }

        let mut url = format!("{}{}?symbol={}&interval={}",
            self.base_url,
            ApiEndpoint::Klines.binance_path(),
            request.symbol.to_uppercase(),
            request.interval
        );

        if let Some(start_time) = request.start_time {
            url.push_str(&format!("&startTime={}", start_time));
        }

        if let Some(end_time) = request.end_time {
            url.push_str(&format!("&endTime={}", end_time));
        }

        if let Some(limit) = request.limit {
            // Binance allows max 1000 klines per request
            let limit = std::cmp::min(limit, BINANCE_MAX_KLINES_LIMIT);
            url.push_str(&format!("&limit={}", limit));
        }

        Ok(url)
    }

    /// Parse Binance klines response into our internal format
    fn parse_klines_response(&self, raw_klines: Vec<serde_json::Value>) -> Result<Vec<Candle>, ApiError> {
        let mut candles = Vec::with_capacity(raw_klines.len());

        for kline_array in raw_klines {
            let array = kline_array.as_array()
                .ok_or_else(|| ApiError::Parse("Expected kline to be an array".to_string()))?;

            if array.len() < 6 {
                return Err(ApiError::Parse(format!("Expected at least 6 elements in kline array, got {}", array.len())));
            }

            candles.push(Candle {
                timestamp: parse_timestamp(&array[0])?,
                open: parse_f64(&array[1])?,
                high: parse_f64(&array[2])?,
                low: parse_f64(&array[3])?,
                close: parse_f64(&array[4])?,
                volume: parse_f64(&array[5])?,
            });
        }

        Ok(candles)
    }

    /// Set minimum request interval for rate limiting
    pub fn set_min_request_interval(&mut self, interval: Duration) {
        self.min_request_interval = interval;
    }

    pub fn stats(&self) -> &ApiStats {
        &self.stats
    }

    /// Rate limit headers of the most recent successful response
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }
}

#[async_trait]
impl CandleSource for BinanceKlinesClient {
    async fn fetch_candles(&mut self, request: &KlinesRequest) -> Result<Vec<Candle>, ApiError> {
        self.fetch_klines(request).await
    }

    fn source_name(&self) -> &'static str {
        "binance"
    }
}

/// Check `interval` against the Binance kline intervals
pub fn validate_interval(interval: &str) -> Result<Seconds, ApiError> {
    interval_to_seconds(interval)
        .ok_or_else(|| ApiError::InvalidTimeframe(format!("Unsupported interval: {}", interval)))
}

/// Symbols containing `query`, case-insensitively, in exchange order
pub fn filter_symbols<'a>(query: &str, symbols: &'a [String]) -> Vec<&'a String> {
    let needle = query.to_lowercase();
    symbols
        .iter()
        .filter(|symbol| symbol.to_lowercase().contains(&needle))
        .collect()
}

/// Exact match first, then a unique substring match
pub fn match_symbol(query: &str, symbols: &[String]) -> Result<String, ApiError> {
    if let Some(exact) = symbols.iter().find(|symbol| symbol.eq_ignore_ascii_case(query)) {
        return Ok(exact.clone());
    }

    let candidates = filter_symbols(query, symbols);
    match candidates.as_slice() {
        [single] => Ok((*single).clone()),
        [] => Err(ApiError::InvalidSymbol(format!("no symbol matches '{}'", query))),
        many => {
            let shown: Vec<&str> = many.iter().take(SYMBOL_SUGGESTION_LIMIT).map(|s| s.as_str()).collect();
            Err(ApiError::InvalidSymbol(format!(
                "'{}' is ambiguous ({} matches): {}",
                query,
                many.len(),
                shown.join(", ")
            )))
        }
    }
}

fn parse_exchange_info(body: &str) -> Result<Vec<String>, ApiError> {
    let info: ExchangeInfoResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::Parse(format!("Failed to parse exchange info: {}", e)))?;

    Ok(info
        .symbols
        .into_iter()
        .filter(|s| s.status == "TRADING")
        .map(|s| s.symbol)
        .collect())
}

/// Parse rate limit information from response headers
fn parse_rate_limit_headers(headers: &reqwest::header::HeaderMap) -> Option<RateLimitInfo> {
    let requests_used = headers.get("x-mbx-used-weight-1m")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok());

    let retry_after = headers.get("retry-after")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok());

    if requests_used.is_none() && retry_after.is_none() {
        return None;
    }

    Some(RateLimitInfo {
        requests_used: requests_used.unwrap_or(0),
        requests_limit: BINANCE_REQUEST_WEIGHT_LIMIT,
        retry_after,
    })
}

/// Parse timestamp from JSON value
fn parse_timestamp(value: &serde_json::Value) -> Result<TimestampMS, ApiError> {
    value.as_i64()
        .ok_or_else(|| ApiError::Parse(format!("Expected timestamp to be i64, got: {:?}", value)))
}

/// Parse f64 from JSON value
fn parse_f64(value: &serde_json::Value) -> Result<f64, ApiError> {
    match value {
        serde_json::Value::String(s) => s.parse::<f64>()
            .map_err(|_| ApiError::Parse(format!("Failed to parse '{}' as f64", s))),
        serde_json::Value::Number(n) => n.as_f64()
            .ok_or_else(|| ApiError::Parse(format!("Failed to convert number to f64: {:?}", n))),
        _ => Err(ApiError::Parse(format!("Expected string or number, got: {:?}", value))),
    }
}
