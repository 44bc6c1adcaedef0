/// Display precision for order prices
///
/// Most FX pairs quote to 5 decimals (pip = 0.0001). JPY-quoted pairs quote
/// to 3 (pip = 0.01).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceFormat {
    pub precision: usize,
}

impl PriceFormat {
    pub const DEFAULT_PRECISION: usize = 5;
    pub const JPY_PRECISION: usize = 3;

    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    /// Precision convention for an OANDA instrument symbol like `EUR_USD`
    pub fn for_instrument(instrument: &str) -> Self {
        let quote = instrument.rsplit('_').next().unwrap_or(instrument);
        if quote.eq_ignore_ascii_case("JPY") {
            Self::new(Self::JPY_PRECISION)
        } else {
            Self::new(Self::DEFAULT_PRECISION)
        }
    }

    /// Format with exactly `precision` decimal digits
    pub fn format(&self, price: f64) -> String {
        format!("{:.*}", self.precision, price)
    }
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PRECISION)
    }
}
