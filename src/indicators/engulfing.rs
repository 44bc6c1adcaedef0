//! Engulfing candlestick pattern
//!
//! Two-candle reversal where the later body covers the earlier body in the
//! opposite direction. Follows TA-Lib's CDLENGULFING scoring:
//! - `+100` / `-100`: bullish / bearish engulfing
//! - `+80` / `-80`: same, but one body edge coincides with the previous one
//! - `0`: no pattern

use crate::models::Candle;

/// +1 for a white (close >= open) candle, -1 for a black one
fn candle_color(candle: &Candle) -> i32 {
    if candle.close >= candle.open {
        1
    } else {
        -1
    }
}

/// Engulfing score of `current` against `prev`
pub fn engulfing_score(prev: &Candle, current: &Candle) -> i32 {
    let color = candle_color(current);
    let prev_color = candle_color(prev);

    let bullish = color == 1
        && prev_color == -1
        && ((current.close >= prev.open && current.open < prev.close)
            || (current.close > prev.open && current.open <= prev.close));

    let bearish = color == -1
        && prev_color == 1
        && ((current.open >= prev.close && current.close < prev.open)
            || (current.open > prev.close && current.close <= prev.open));

    if !bullish && !bearish {
        return 0;
    }

    if current.open != prev.close && current.close != prev.open {
        color * 100
    } else {
        color * 80
    }
}

/// Engulfing score for every candle, aligned with `candles` (first is 0)
pub fn engulfing_series(candles: &[Candle]) -> Vec<i32> {
    let mut series = Vec::with_capacity(candles.len());
    if candles.is_empty() {
        return series;
    }

    series.push(0);
    series.extend(candles.windows(2).map(|pair| engulfing_score(&pair[0], &pair[1])));
    series
}
