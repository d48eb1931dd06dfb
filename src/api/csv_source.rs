use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::api::exchange::CandleSource;
use crate::api::types::{ApiError, KlinesRequest};
use crate::historical::structs::Candle;

/// Candle source backed by a local CSV file.
///
/// Expected header: `timestamp,open,high,low,close,volume`, rows oldest first.
/// The request's symbol and interval are not used; `limit` keeps the most
/// recent rows and the time range filters by timestamp.
#[derive(Debug, Clone)]
pub struct CsvCandleSource {
    path: PathBuf,
}

impl CsvCandleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse CSV bytes into candles
pub fn parse_candles_csv(data: &[u8]) -> Result<Vec<Candle>, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut candles = Vec::new();
    for (row, record) in reader.deserialize::<Candle>().enumerate() {
        // +2: header line and 1-based numbering
        let candle = record.map_err(|e| ApiError::Csv(format!("row {}: {}", row + 2, e)))?;
        candles.push(candle);
    }
    Ok(candles)
}

fn apply_request(mut candles: Vec<Candle>, request: &KlinesRequest) -> Vec<Candle> {
    if let Some(start) = request.start_time {
        candles.retain(|c| c.timestamp >= start);
    }
    if let Some(end) = request.end_time {
        candles.retain(|c| c.timestamp <= end);
    }
    if let Some(limit) = request.limit {
        let limit = limit as usize;
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
    }
    candles
}

#[async_trait]
impl CandleSource for CsvCandleSource {
    async fn fetch_candles(&mut self, request: &KlinesRequest) -> Result<Vec<Candle>, ApiError> {
        debug!("Reading candles from {}", self.path.display());

        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ApiError::Io(format!("{}: {}", self.path.display(), e)))?;

        let candles = apply_request(parse_candles_csv(&data)?, request);

        info!("✅ Read {} candles from {}", candles.len(), self.path.display());
        Ok(candles)
    }

    fn source_name(&self) -> &'static str {
        "csv"
    }
}
