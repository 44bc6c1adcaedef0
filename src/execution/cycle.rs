use crate::api::{BrokerExecution, MarketDataProvider};
use crate::config::BotConfig;
use crate::error::{BotError, Result};
use crate::execution::trade::{build_order, TradeReport};
use crate::indicators::calculate_atr;
use crate::models::{Direction, OrderRequest, PositionStatus};
use crate::risk::BracketConfig;
use crate::strategy::{Strategy, TrendEngulfingStrategy};

/// How a decision cycle ended
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Existing exposure on the instrument, nothing evaluated
    PositionAlreadyOpen { long_units: f64, short_units: f64 },
    /// Rules did not fire on the last closed candle
    NoSignal,
    TradePlaced(TradeReport),
    /// Broker refused or failed the order; the cycle still completed
    TradeFailed {
        direction: Direction,
        order: OrderRequest,
        error: String,
    },
}

/// One check-position / evaluate / maybe-trade pass
///
/// Holds its configuration and collaborators explicitly; nothing is
/// process-global. Each `run` is independent and never retries.
pub struct DecisionCycle<M, B> {
    config: BotConfig,
    strategy: TrendEngulfingStrategy,
    bracket: BracketConfig,
    market: M,
    broker: B,
}

impl<M, B> DecisionCycle<M, B>
where
    M: MarketDataProvider,
    B: BrokerExecution,
{
    pub fn new(config: BotConfig, market: M, broker: B) -> Self {
        Self {
            config,
            strategy: TrendEngulfingStrategy::default(),
            bracket: BracketConfig::default(),
            market,
            broker,
        }
    }

    /// Run the full cycle
    ///
    /// Configuration is validated before any collaborator is touched.
    /// Position-query and candle-fetch failures abort with an error; a
    /// failed order submission is reported as `TradeFailed`.
    pub async fn run(&self) -> Result<CycleOutcome> {
        let credentials = self.config.credentials()?;
        self.config.validate_settings()?;

        let needed = self.strategy.min_candles_required();
        if self.config.signal_candle_count < needed {
            return Err(BotError::Configuration(format!(
                "signal_candle_count {} is below the {} candles {} needs",
                self.config.signal_candle_count,
                needed,
                self.strategy.name()
            )));
        }

        let atr_needed = self.strategy.config().atr_period + 1;
        if self.config.execution_candle_count < atr_needed {
            return Err(BotError::Configuration(format!(
                "execution_candle_count {} is below the {} candles ATR({}) needs",
                self.config.execution_candle_count,
                atr_needed,
                self.strategy.config().atr_period
            )));
        }

        tracing::info!(
            instrument = %self.config.instrument,
            granularity = %self.config.granularity,
            strategy = self.strategy.name(),
            "Running decision cycle"
        );

        let position = self
            .broker
            .position(&credentials.account_id, &self.config.instrument)
            .await
            .map_err(BotError::PositionQuery)?;

        if let PositionStatus::Open {
            long_units,
            short_units,
        } = position
        {
            tracing::info!(long_units, short_units, "Position already open, skipping check");
            return Ok(CycleOutcome::PositionAlreadyOpen {
                long_units,
                short_units,
            });
        }

        let candles = self
            .market
            .fetch_candles(
                &self.config.instrument,
                &self.config.granularity,
                self.config.signal_candle_count,
            )
            .await
            .map_err(BotError::DataFetch)?;

        let signal = self.strategy.generate_signal(&candles)?;

        match signal.direction() {
            Some(direction) => {
                tracing::info!(%direction, "Signal fired");
                self.execute_trade(direction).await
            }
            None => {
                tracing::info!("No signal found");
                Ok(CycleOutcome::NoSignal)
            }
        }
    }

    /// Size a bracket from a fresh ATR and submit one market order
    pub async fn execute_trade(&self, direction: Direction) -> Result<CycleOutcome> {
        let credentials = self.config.credentials()?;
        let atr_period = self.strategy.config().atr_period;

        // Separate short fetch so the stop uses the latest volatility
        let candles = self
            .market
            .fetch_candles(
                &self.config.instrument,
                &self.config.granularity,
                self.config.execution_candle_count,
            )
            .await
            .map_err(BotError::DataFetch)?;

        let atr = calculate_atr(&candles, atr_period).ok_or(BotError::InsufficientData {
            needed: atr_period + 1,
            got: candles.len(),
        })?;
        if !atr.is_finite() || atr <= 0.0 {
            return Err(BotError::Indicator(format!(
                "ATR({}) is {}, cannot size stop distance",
                atr_period, atr
            )));
        }

        let entry = candles
            .last()
            .map(|c| c.close)
            .ok_or_else(|| BotError::Indicator("no candle for entry price".to_string()))?;

        let levels = self.bracket.levels(direction, entry, atr);
        let order = build_order(
            &self.config.instrument,
            direction,
            self.config.trade_size,
            &levels,
            self.config.price_format(),
        );

        tracing::info!(
            %direction,
            units = order.units,
            entry,
            atr,
            stop_loss = %order.stop_loss,
            take_profit = %order.take_profit,
            "Submitting bracketed market order"
        );

        match self
            .broker
            .submit_order(&credentials.account_id, &order)
            .await
        {
            Ok(receipt) => {
                tracing::info!(
                    order_id = %receipt.order_id,
                    trade_id = ?receipt.trade_id,
                    fill_price = ?receipt.fill_price,
                    "Trade placed: {} {}",
                    direction,
                    self.config.instrument
                );
                tracing::info!(response = %receipt.raw, "Broker response");

                Ok(CycleOutcome::TradePlaced(TradeReport {
                    direction,
                    order,
                    levels,
                    receipt,
                }))
            }
            Err(e) => {
                tracing::error!(%direction, error = %e, "Error placing trade");
                Ok(CycleOutcome::TradeFailed {
                    direction,
                    order,
                    error: e.to_string(),
                })
            }
        }
    }
}
