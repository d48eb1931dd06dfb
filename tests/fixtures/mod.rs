#![allow(dead_code)]

use volume_levels::Candle;

pub const BASE_TIMESTAMP: i64 = 1640995200000;
pub const HOUR_MS: i64 = 3_600_000;

/// Create sample OHLCV candle data for testing
pub fn create_sample_candle(timestamp: i64, price: f64, volume: f64) -> Candle {
    Candle {
        timestamp,
        open: price,
        high: price + 1.0,
        low: price - 1.0,
        close: price + 0.5,
        volume,
    }
}

/// The two-candle, three-bin worked example
pub fn two_candle_sample() -> Vec<Candle> {
    vec![
        Candle::new(BASE_TIMESTAMP, 10.0, 12.0, 9.0, 11.0, 100.0),
        Candle::new(BASE_TIMESTAMP + HOUR_MS, 11.0, 11.0, 10.0, 10.0, 50.0),
    ]
}

/// Deterministic wandering series of well-formed hourly candles
pub fn synthetic_series(count: usize) -> Vec<Candle> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = move || {
        // xorshift64
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 10_000) as f64 / 10_000.0
    };

    let mut price = 100.0;
    (0..count)
        .map(|i| {
            let open = price;
            let close = (open + (next() - 0.5) * 4.0).max(1.0);
            let high = open.max(close) + next() * 2.0;
            let low = (open.min(close) - next() * 2.0).max(0.5);
            let volume = (next() * 1_000.0).round() / 10.0;
            price = close;
            Candle::new(BASE_TIMESTAMP + i as i64 * HOUR_MS, open, high, low, close, volume)
        })
        .collect()
}

/// Render candles in the CSV layout the file source reads
pub fn candles_to_csv(candles: &[Candle]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for c in candles {
        out.push_str(&format!("{},{},{},{},{},{}\n", c.timestamp, c.open, c.high, c.low, c.close, c.volume));
    }
    out
}
