/// Profile policy constants
// Bucketing
pub const DEFAULT_BIN_COUNT: usize = 100;
pub const MIDPOINT_DECIMALS: u32 = 6;

// Hit and volume weighting per OHLC field
pub const OPEN_CLOSE_HITS: u64 = 3;
pub const WICK_HITS: u64 = 1;
pub const WICK_VOLUME_DIVISOR: f64 = 3.0;

// Selection: keep bins scoring above top_score / SELECTION_DIVISOR
pub const SELECTION_DIVISOR: f64 = 4.0;
pub const MAX_WEIGHT_PERCENT: f64 = 100.0;

// Candle passes switch to rayon at this many candles
pub const PARALLEL_THRESHOLD: usize = 4096;

// Binance REST
pub const BINANCE_API_URL: &str = "https://api.binance.com";
pub const BINANCE_KLINES_PATH: &str = "/api/v3/klines";
pub const BINANCE_EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";
pub const BINANCE_MAX_KLINES_LIMIT: u32 = 1000;
// Spot request weight allowed per minute
pub const BINANCE_REQUEST_WEIGHT_LIMIT: u32 = 6000;
pub const DEFAULT_KLINES_LIMIT: u32 = 500;
pub const DEFAULT_MIN_REQUEST_INTERVAL_MS: u64 = 50;
pub const HTTP_TIMEOUT_SECS: u64 = 30;
// Pause before the single retry of a recoverable fetch failure
pub const FETCH_RETRY_DELAY_MS: u64 = 250;

// Symbol lookup shows at most this many candidates
pub const SYMBOL_SUGGESTION_LIMIT: usize = 8;

// Default values
pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
pub const DEFAULT_INTERVAL: &str = "1h";
pub const DEFAULT_LOG_FILTER: &str = "info,volume_levels=info";
pub const LOG_FILE_PREFIX: &str = "volume_levels";
