use crate::indicators::{IndicatorParams, IndicatorRow};
use crate::models::Signal;

/// Configuration for signal generation
#[derive(Debug, Clone)]
pub struct SignalConfig {
    pub fast_ma_period: usize,
    pub slow_ma_period: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    /// RSI above this is bullish momentum, below is bearish
    pub rsi_threshold: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            fast_ma_period: 20,
            slow_ma_period: 50,
            rsi_period: 14,
            atr_period: 14,
            rsi_threshold: 50.0,
        }
    }
}

impl SignalConfig {
    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            fast_ma_period: self.fast_ma_period,
            slow_ma_period: self.slow_ma_period,
            rsi_period: self.rsi_period,
            atr_period: self.atr_period,
        }
    }

    /// Candles needed so the closed row has a settled slow MA
    ///
    /// One extra for the forming candle that is never evaluated.
    pub fn min_candles(&self) -> usize {
        self.slow_ma_period.max(self.rsi_period + 1) + 1
    }
}

/// Evaluate the entry rules against one indicator row
///
/// - Buy: fast MA > slow MA, RSI > threshold, bullish engulfing
/// - Sell: fast MA < slow MA, RSI < threshold, bearish engulfing
///
/// Rows still in warm-up (any indicator missing) always hold.
pub fn evaluate_row(row: &IndicatorRow, rsi_threshold: f64) -> Signal {
    let (Some(fast), Some(slow), Some(rsi)) = (row.sma_fast, row.sma_slow, row.rsi) else {
        return Signal::Hold;
    };

    let buy = fast > slow && rsi > rsi_threshold && row.engulfing > 0;
    let sell = fast < slow && rsi < rsi_threshold && row.engulfing < 0;

    if buy {
        Signal::Buy
    } else if sell {
        Signal::Sell
    } else {
        Signal::Hold
    }
}
