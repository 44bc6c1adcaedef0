use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candlestick for one time bucket (mid prices)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Broker-reported "bucket closed" flag. Informational only.
    pub complete: bool,
}

/// Trading signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Direction to trade for this signal, if any
    pub fn direction(self) -> Option<Direction> {
        match self {
            Signal::Buy => Some(Direction::Buy),
            Signal::Sell => Some(Direction::Sell),
            Signal::Hold => None,
        }
    }
}

/// Side of a market entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// +1 for buys, -1 for sells
    pub fn sign(self) -> i64 {
        match self {
            Direction::Buy => 1,
            Direction::Sell => -1,
        }
    }

    /// Signed unit count for an order of `trade_size` units
    ///
    /// Sizes beyond `i64::MAX` are clamped so the sign always matches the
    /// direction; `BotConfig::validate_settings` rejects them up front.
    pub fn signed_units(self, trade_size: u64) -> i64 {
        self.sign() * i64::try_from(trade_size).unwrap_or(i64::MAX)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Broker-side position for one instrument
///
/// Units are kept as reported; fractional exposure still counts as open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionStatus {
    /// Position record exists with nonzero exposure
    Open { long_units: f64, short_units: f64 },
    /// Position record exists but both sides are zero
    Flat,
    /// Broker has no position record for the instrument (HTTP 404)
    NotPresent,
}

impl PositionStatus {
    /// Build from the broker's long/short unit counts
    pub fn from_units(long_units: f64, short_units: f64) -> Self {
        if long_units != 0.0 || short_units != 0.0 {
            PositionStatus::Open {
                long_units,
                short_units,
            }
        } else {
            PositionStatus::Flat
        }
    }
}

/// Market order with stop-loss and take-profit attached on fill
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub instrument: String,
    /// Positive = buy, negative = sell
    pub units: i64,
    /// Already formatted to the instrument's price precision
    pub take_profit: String,
    pub stop_loss: String,
}

impl OrderRequest {
    /// Build the v20 `{"order": {...}}` request body
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "order": {
                "units": self.units.to_string(),
                "instrument": self.instrument,
                "type": "MARKET",
                "timeInForce": "FOK",
                "positionFill": "DEFAULT",
                "takeProfitOnFill": { "price": self.take_profit },
                "stopLossOnFill": { "price": self.stop_loss },
            }
        })
    }
}

/// Broker acknowledgement of a filled order
#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub order_id: String,
    pub fill_id: Option<String>,
    pub trade_id: Option<String>,
    pub fill_price: Option<f64>,
    /// Full broker response, echoed in the run log
    pub raw: serde_json::Value,
}
