// Trading strategy module
pub mod signals;
pub mod trend_engulfing;

pub use signals::{evaluate_row, SignalConfig};
pub use trend_engulfing::TrendEngulfingStrategy;

use crate::error::Result;
use crate::models::{Candle, Signal};

/// Base trait for all trading strategies
pub trait Strategy: Send + Sync {
    /// Generate a trading signal based on market data
    ///
    /// The newest candle may still be forming; implementations must not
    /// read it.
    fn generate_signal(&self, candles: &[Candle]) -> Result<Signal>;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Minimum candles required for this strategy
    fn min_candles_required(&self) -> usize;
}
