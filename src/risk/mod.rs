// Risk management module
pub mod bracket;
pub mod price_format;

pub use bracket::{BracketConfig, BracketLevels};
pub use price_format::PriceFormat;
