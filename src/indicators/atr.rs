/// Average True Range (ATR) indicator
///
/// Measures market volatility by calculating the average of true ranges over a period.
/// True Range is the greatest of:
/// - Current High - Current Low
/// - Abs(Current High - Previous Close)
/// - Abs(Current Low - Previous Close)
///
/// Uses Wilder's smoothing (same as RSI) for the moving average.

use crate::models::Candle;

/// Calculate ATR for the given candles
///
/// Returns the current ATR value, or None if insufficient data
pub fn calculate_atr(candles: &[Candle], period: usize) -> Option<f64> {
    atr_series(candles, period).last().copied().flatten()
}

/// ATR for every candle, aligned with `candles`
///
/// True ranges start at index 1 (they need a previous close), so the first
/// value appears at index `period`.
pub fn atr_series(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let mut series = vec![None; candles.len()];
    if period == 0 || candles.len() < period + 1 {
        return series;
    }

    let true_ranges = true_ranges(candles);
    let period_f = period as f64;

    // First ATR is simple average of first 'period' true ranges
    let mut atr: f64 = true_ranges.iter().take(period).sum::<f64>() / period_f;
    series[period] = Some(atr);

    // Apply Wilder's smoothing for subsequent values
    for i in period..true_ranges.len() {
        atr = (atr * (period_f - 1.0) + true_ranges[i]) / period_f;
        series[i + 1] = Some(atr);
    }

    series
}

/// True range of each candle against its predecessor (one shorter than input)
fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|pair| {
            let prev_close = pair[0].close;
            let high = pair[1].high;
            let low = pair[1].low;

            (high - low)
                .max((high - prev_close).abs())
                .max((low - prev_close).abs())
        })
        .collect()
}
