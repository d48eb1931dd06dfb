use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::exchange::CandleSource;
use crate::api::types::{ApiError, KlinesRequest};
use crate::common::constants::FETCH_RETRY_DELAY_MS;
use crate::errors::AppError;
use crate::historical::structs::{Candle, TimeRange};
use crate::historical::utils::{candle_time_range, describe_candle_span};
use crate::volume_profile::{compute_with_options, ProfileOptions, VolumeProfile};

/// A computed profile together with what it was computed from
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub symbol: String,
    pub interval: String,
    pub source: &'static str,
    pub span: Option<TimeRange>,
    pub profile: VolumeProfile,
}

/// Fetch candles from `source`, then run the profile over them.
pub async fn load_and_profile(
    source: &mut dyn CandleSource,
    request: &KlinesRequest,
    options: &ProfileOptions,
) -> Result<ProfileReport, AppError> {
    info!("Loading price for {} {} from {}", request.symbol, request.interval, source.source_name());

    let candles = fetch_with_retry(source, request).await?;
    info!("{}", describe_candle_span(&candles));

    let profile = compute_with_options(&candles, options)?;
    debug!(
        bins = options.bin_count,
        min = profile.range.min,
        max = profile.range.max,
        step = profile.step,
        total_volume = profile.total_volume,
        top_score = profile.top_score,
        levels = profile.levels.len(),
        "Volume profile computed"
    );

    Ok(ProfileReport {
        symbol: request.symbol.clone(),
        interval: request.interval.clone(),
        source: source.source_name(),
        span: candle_time_range(&candles),
        profile,
    })
}

/// One retry for transient failures. Rate limit errors are returned as is.
async fn fetch_with_retry(
    source: &mut dyn CandleSource,
    request: &KlinesRequest,
) -> Result<Vec<Candle>, ApiError> {
    match source.fetch_candles(request).await {
        Err(e) if e.is_recoverable() && !e.is_rate_limit() => {
            warn!("⚠️ {} fetch failed ({}), retrying once", source.source_name(), e);
            tokio::time::sleep(Duration::from_millis(FETCH_RETRY_DELAY_MS)).await;
            source.fetch_candles(request).await
        }
        Err(e) if e.is_rate_limit() => {
            warn!("⏳ {} is rate limiting requests, try again later", source.source_name());
            Err(e)
        }
        result => result,
    }
}
