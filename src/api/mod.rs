pub mod oanda;

pub use oanda::OandaClient;

use crate::error::ApiError;
use crate::models::{Candle, OrderReceipt, OrderRequest, PositionStatus};

/// Source of recent price candles
#[allow(async_fn_in_trait)]
pub trait MarketDataProvider {
    /// Most recent `count` candles, oldest first
    async fn fetch_candles(
        &self,
        instrument: &str,
        granularity: &str,
        count: usize,
    ) -> Result<Vec<Candle>, ApiError>;
}

/// Broker-side position lookup and order entry
#[allow(async_fn_in_trait)]
pub trait BrokerExecution {
    /// Current position; a missing position record is `NotPresent`, not an error
    async fn position(&self, account_id: &str, instrument: &str)
        -> Result<PositionStatus, ApiError>;

    /// Submit one order; rejections and FOK cancellations are errors
    async fn submit_order(
        &self,
        account_id: &str,
        order: &OrderRequest,
    ) -> Result<OrderReceipt, ApiError>;
}
