pub mod binance;
pub mod csv_source;
pub mod exchange;
pub mod types;

pub use binance::BinanceKlinesClient;
pub use csv_source::CsvCandleSource;
pub use exchange::*;
pub use types::*;
