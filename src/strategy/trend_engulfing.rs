use super::{
    signals::{evaluate_row, SignalConfig},
    Strategy,
};
use crate::error::{BotError, Result};
use crate::indicators::IndicatorSet;
use crate::models::{Candle, Signal};

/// Trend-following engulfing entry
///
/// Takes a reversal candle only when it agrees with the prevailing trend:
/// - Fast vs slow SMA for trend direction
/// - RSI relative to 50 for momentum bias
/// - Engulfing pattern on the last closed candle as the trigger
#[derive(Debug, Clone, Default)]
pub struct TrendEngulfingStrategy {
    config: SignalConfig,
}

impl TrendEngulfingStrategy {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }
}

impl Strategy for TrendEngulfingStrategy {
    fn generate_signal(&self, candles: &[Candle]) -> Result<Signal> {
        if candles.len() < self.min_candles_required() {
            return Err(BotError::InsufficientData {
                needed: self.min_candles_required(),
                got: candles.len(),
            });
        }

        let indicators = IndicatorSet::compute(candles, &self.config.indicator_params());
        let last = indicators
            .last_closed()
            .ok_or_else(|| BotError::Indicator("no closed candle to evaluate".to_string()))?;

        tracing::debug!(
            sma_fast = ?last.sma_fast,
            sma_slow = ?last.sma_slow,
            rsi = ?last.rsi,
            engulfing = last.engulfing,
            "Evaluating last closed candle"
        );

        Ok(evaluate_row(last, self.config.rsi_threshold))
    }

    fn name(&self) -> &str {
        "TrendEngulfingStrategy"
    }

    fn min_candles_required(&self) -> usize {
        self.config.min_candles()
    }
}
