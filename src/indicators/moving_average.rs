/// Calculate Simple Moving Average (SMA) of the last `period` prices
pub fn calculate_sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let sum: f64 = prices.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// SMA for every index, aligned with `prices`
///
/// The first `period - 1` entries are `None` (window not yet full).
pub fn sma_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut series = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return series;
    }

    let mut window_sum: f64 = prices[..period].iter().sum();
    series[period - 1] = Some(window_sum / period as f64);

    for i in period..prices.len() {
        window_sum += prices[i] - prices[i - period];
        series[i] = Some(window_sum / period as f64);
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = calculate_sma(&prices, 5);
        assert_eq!(sma, Some(104.0));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let prices = vec![100.0, 102.0];
        let sma = calculate_sma(&prices, 5);
        assert!(sma.is_none());
    }

    #[test]
    fn test_sma_series_alignment() {
        let prices = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let series = sma_series(&prices, 3);

        assert_eq!(series.len(), prices.len());
        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        assert_eq!(series[2], Some(2.0));
        assert_eq!(series[3], Some(3.0));
        assert_eq!(series[4], Some(4.0));
    }

    #[test]
    fn test_sma_series_matches_latest() {
        let prices: Vec<f64> = (0..60).map(|i| 1.1 + (i as f64 * 0.37).sin() * 0.01).collect();
        let series = sma_series(&prices, 20);
        let latest = calculate_sma(&prices, 20).unwrap();

        assert!((series[59].unwrap() - latest).abs() < 1e-12);
    }
}
