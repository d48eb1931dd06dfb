pub mod structs;
pub mod utils;

pub use structs::{Candle, Seconds, TimeRange, TimestampMS};
