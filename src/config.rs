use config::{Config, Environment};
use serde::Deserialize;

use crate::error::BotError;
use crate::risk::PriceFormat;

/// Prefix of every environment variable read by the bot (`OANDA_*`)
pub const ENV_PREFIX: &str = "OANDA";

/// OANDA REST environment, parsed case-insensitively from env and CLI alike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum TradingEnvironment {
    Practice,
    Live,
}

impl TradingEnvironment {
    pub fn api_base(self) -> &'static str {
        match self {
            TradingEnvironment::Practice => "https://api-fxpractice.oanda.com",
            TradingEnvironment::Live => "https://api-fxtrade.oanda.com",
        }
    }
}

impl std::str::FromStr for TradingEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "practice" => Ok(TradingEnvironment::Practice),
            "live" => Ok(TradingEnvironment::Live),
            other => Err(format!("unknown environment '{}' (expected practice or live)", other)),
        }
    }
}

impl TryFrom<String> for TradingEnvironment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Run configuration, immutable once loaded
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub access_token: Option<String>,
    pub account_id: Option<String>,
    pub environment: TradingEnvironment,
    pub instrument: String,
    /// Candle granularity, e.g. `M5`
    pub granularity: String,
    /// Units per trade (sign is applied from the direction)
    pub trade_size: u64,
    /// Candles fetched for signal evaluation
    pub signal_candle_count: usize,
    /// Candles fetched at execution time for a fresh ATR
    pub execution_candle_count: usize,
    /// Overrides the instrument's default price precision
    pub price_precision: Option<usize>,
}

/// Validated broker credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub account_id: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            account_id: None,
            environment: TradingEnvironment::Practice,
            instrument: "EUR_USD".to_string(),
            granularity: "M5".to_string(),
            trade_size: 600,
            signal_candle_count: 100,
            execution_candle_count: 15,
            price_precision: None,
        }
    }
}

impl BotConfig {
    /// Load from `OANDA_*` environment variables over built-in defaults
    pub fn from_env() -> Result<Self, BotError> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    fn load(env: Environment) -> Result<Self, BotError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("environment", "practice")
            .and_then(|b| b.set_default("instrument", defaults.instrument))
            .and_then(|b| b.set_default("granularity", defaults.granularity))
            .and_then(|b| b.set_default("trade_size", defaults.trade_size))
            .and_then(|b| b.set_default("signal_candle_count", defaults.signal_candle_count as u64))
            .and_then(|b| {
                b.set_default("execution_candle_count", defaults.execution_candle_count as u64)
            })
            .map_err(|e| BotError::Configuration(e.to_string()))?
            .add_source(env.try_parsing(true))
            .build()
            .map_err(|e| BotError::Configuration(e.to_string()))?;

        let config: BotConfig = settings
            .try_deserialize()
            .map_err(|e| BotError::Configuration(e.to_string()))?;

        config.validate_settings()?;
        Ok(config)
    }

    /// Check the non-credential settings
    pub fn validate_settings(&self) -> Result<(), BotError> {
        if self.instrument.trim().is_empty() {
            return Err(BotError::Configuration("instrument is empty".to_string()));
        }
        if self.granularity.trim().is_empty() {
            return Err(BotError::Configuration("granularity is empty".to_string()));
        }
        if self.trade_size == 0 {
            return Err(BotError::Configuration("trade_size must be positive".to_string()));
        }
        if i64::try_from(self.trade_size).is_err() {
            return Err(BotError::Configuration(format!(
                "trade_size {} exceeds the maximum of {} units",
                self.trade_size,
                i64::MAX
            )));
        }
        Ok(())
    }

    /// Credentials, or a configuration error naming what is missing
    pub fn credentials(&self) -> Result<Credentials, BotError> {
        let token = non_blank(self.access_token.as_deref());
        let account = non_blank(self.account_id.as_deref());

        match (token, account) {
            (Some(access_token), Some(account_id)) => Ok(Credentials {
                access_token: access_token.to_string(),
                account_id: account_id.to_string(),
            }),
            (None, None) => Err(BotError::Configuration(
                "OANDA_ACCESS_TOKEN and OANDA_ACCOUNT_ID are not set".to_string(),
            )),
            (None, _) => Err(BotError::Configuration(
                "OANDA_ACCESS_TOKEN is not set".to_string(),
            )),
            (_, None) => Err(BotError::Configuration(
                "OANDA_ACCOUNT_ID is not set".to_string(),
            )),
        }
    }

    pub fn price_format(&self) -> PriceFormat {
        match self.price_precision {
            Some(precision) => PriceFormat::new(precision),
            None => PriceFormat::for_instrument(&self.instrument),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
