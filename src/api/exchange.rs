use async_trait::async_trait;

use crate::api::types::{ApiError, KlinesRequest};
use crate::historical::structs::Candle;

/// Anything that can hand over an ordered candle sequence for one instrument.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Candles for the request, oldest first.
    async fn fetch_candles(&mut self, request: &KlinesRequest) -> Result<Vec<Candle>, ApiError>;

    /// Source name for identification in logs
    fn source_name(&self) -> &'static str;
}
