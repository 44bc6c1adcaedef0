use crate::models::Direction;

/// ATR-based stop-loss / take-profit sizing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketConfig {
    /// Stop distance as a multiple of ATR
    pub atr_multiplier: f64,
    /// Take-profit distance as a multiple of the stop distance
    pub reward_ratio: f64,
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            atr_multiplier: 1.5, // stop 1.5 ATR away
            reward_ratio: 2.0,   // 1:2 risk-reward
        }
    }
}

/// Exit prices for one entry, in raw price units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub stop_distance: f64,
    pub take_profit_distance: f64,
}

impl BracketConfig {
    /// Place stop and target around `entry`
    ///
    /// Buys: stop below, target above. Sells: inverted.
    pub fn levels(&self, direction: Direction, entry: f64, atr: f64) -> BracketLevels {
        let stop_distance = atr * self.atr_multiplier;
        let take_profit_distance = stop_distance * self.reward_ratio;
        let sign = direction.sign() as f64;

        BracketLevels {
            entry,
            stop_loss: entry - sign * stop_distance,
            take_profit: entry + sign * take_profit_distance,
            stop_distance,
            take_profit_distance,
        }
    }
}
