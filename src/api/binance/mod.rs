pub mod klines;

pub use klines::{filter_symbols, match_symbol, validate_interval, BinanceKlinesClient};
