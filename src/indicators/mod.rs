// Technical indicators module
// Implements SMA, RSI, ATR and the engulfing pattern for signal evaluation

pub mod atr;
pub mod engulfing;
pub mod moving_average;
pub mod rsi;

pub use atr::{atr_series, calculate_atr};
pub use engulfing::{engulfing_score, engulfing_series};
pub use moving_average::{calculate_sma, sma_series};
pub use rsi::{calculate_rsi, rsi_series};

use crate::models::Candle;

/// Window lengths for the indicator table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub fast_ma_period: usize,
    pub slow_ma_period: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            fast_ma_period: 20,
            slow_ma_period: 50,
            rsi_period: 14,
            atr_period: 14,
        }
    }
}

/// Indicator values attached to one candle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    pub engulfing: i32,
}

/// Per-candle indicator table, one row per input candle
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    rows: Vec<IndicatorRow>,
}

impl IndicatorSet {
    pub fn compute(candles: &[Candle], params: &IndicatorParams) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let sma_fast = sma_series(&closes, params.fast_ma_period);
        let sma_slow = sma_series(&closes, params.slow_ma_period);
        let rsi = rsi_series(&closes, params.rsi_period);
        let atr = atr_series(candles, params.atr_period);
        let engulfing = engulfing_series(candles);

        let rows = (0..candles.len())
            .map(|i| IndicatorRow {
                sma_fast: sma_fast[i],
                sma_slow: sma_slow[i],
                rsi: rsi[i],
                atr: atr[i],
                engulfing: engulfing[i],
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    /// Row of the last fully closed candle (`len - 2`)
    ///
    /// The newest candle may still be forming and is never returned.
    pub fn last_closed(&self) -> Option<&IndicatorRow> {
        let idx = self.rows.len().checked_sub(2)?;
        self.rows.get(idx)
    }
}
