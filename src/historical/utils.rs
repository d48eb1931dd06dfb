use chrono::{DateTime, Utc};

use super::structs::{Candle, Seconds, TimeRange, TimestampMS};

// Convert Binance interval strings to Seconds
pub fn interval_to_seconds(interval: &str) -> Option<Seconds> {
    match interval {
        "1s" => Some(1),
        "1m" => Some(60),
        "3m" => Some(180),
        "5m" => Some(300),
        "15m" => Some(900),
        "30m" => Some(1800),
        "1h" => Some(3600),
        "2h" => Some(7200),
        "4h" => Some(14400),
        "6h" => Some(21600),
        "8h" => Some(28800),
        "12h" => Some(43200),
        "1d" => Some(86400),
        "3d" => Some(259200),
        "1w" => Some(604800),
        // Calendar month; 30 days is only used for span estimates
        "1M" => Some(2592000),
        _ => None,
    }
}

pub fn format_timestamp(timestamp_ms: TimestampMS) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("INVALID_TIME({})", timestamp_ms))
}

/// Short month-first form used in the candle span summary.
pub fn format_display_timestamp(timestamp_ms: TimestampMS) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%m/%d/%Y %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("INVALID_TIME({})", timestamp_ms))
}

/// First and last timestamp of an ordered candle sequence.
pub fn candle_time_range(candles: &[Candle]) -> Option<TimeRange> {
    let first = candles.first()?;
    let last = candles.last()?;
    Some(TimeRange {
        start: first.timestamp,
        end: last.timestamp,
    })
}

/// "Loaded N frames from X to Y" line reported after retrieval.
pub fn describe_candle_span(candles: &[Candle]) -> String {
    match candle_time_range(candles) {
        Some(range) => format!(
            "Loaded {} frames from {} to {}",
            candles.len(),
            format_display_timestamp(range.start),
            format_display_timestamp(range.end)
        ),
        None => "Loaded 0 frames".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_to_seconds() {
        assert_eq!(interval_to_seconds("1m"), Some(60));
        assert_eq!(interval_to_seconds("4h"), Some(14400));
        assert_eq!(interval_to_seconds("1w"), Some(604800));
        assert_eq!(interval_to_seconds("7m"), None);
        assert_eq!(interval_to_seconds(""), None);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1640995200000), "2022-01-01 00:00:00 UTC");
        assert_eq!(format_display_timestamp(1641038400000), "01/01/2022 12:00:00");
    }

    #[test]
    fn test_describe_candle_span() {
        let candles = vec![
            Candle::new(1640995200000, 1.0, 1.0, 1.0, 1.0, 1.0),
            Candle::new(1640998800000, 1.0, 1.0, 1.0, 1.0, 1.0),
        ];
        assert_eq!(
            candle_time_range(&candles),
            Some(TimeRange { start: 1640995200000, end: 1640998800000 })
        );
        assert_eq!(
            describe_candle_span(&candles),
            "Loaded 2 frames from 01/01/2022 00:00:00 to 01/01/2022 01:00:00"
        );
        assert_eq!(describe_candle_span(&[]), "Loaded 0 frames");
    }
}
