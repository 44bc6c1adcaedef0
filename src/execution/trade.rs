use crate::models::{Direction, OrderReceipt, OrderRequest};
use crate::risk::{BracketLevels, PriceFormat};

/// Build the bracketed market order for one entry
pub fn build_order(
    instrument: &str,
    direction: Direction,
    trade_size: u64,
    levels: &BracketLevels,
    format: PriceFormat,
) -> OrderRequest {
    OrderRequest {
        instrument: instrument.to_string(),
        units: direction.signed_units(trade_size),
        take_profit: format.format(levels.take_profit),
        stop_loss: format.format(levels.stop_loss),
    }
}

/// What was sent and what the broker answered
#[derive(Debug, Clone)]
pub struct TradeReport {
    pub direction: Direction,
    pub order: OrderRequest,
    pub levels: BracketLevels,
    pub receipt: OrderReceipt,
}
