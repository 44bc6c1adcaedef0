// Decision cycle and order construction
pub mod cycle;
pub mod trade;

pub use cycle::{CycleOutcome, DecisionCycle};
pub use trade::{build_order, TradeReport};
