use chrono::NaiveDate;
use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};

/// The fixed feature set every row carries, in declared observation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Feature {
    Close,
    Sma10,
    Sma50,
    Rsi,
    Macd,
    Adx,
    BbUpper,
    BbLower,
    BollingerWidth,
    Ema20,
    Vwap,
    LaggedReturn,
    Volatility,
}

impl Feature {
    pub const COUNT: usize = <Feature as Enum>::LENGTH;

    /// Column name the feature is known by in data files.
    pub fn column(self) -> &'static str {
        match self {
            Feature::Close => "Close",
            Feature::Sma10 => "SMA10",
            Feature::Sma50 => "SMA50",
            Feature::Rsi => "RSI",
            Feature::Macd => "MACD",
            Feature::Adx => "ADX",
            Feature::BbUpper => "BB_Upper",
            Feature::BbLower => "BB_Lower",
            Feature::BollingerWidth => "Bollinger_Width",
            Feature::Ema20 => "EMA20",
            Feature::Vwap => "VWAP",
            Feature::LaggedReturn => "Lagged_Return",
            Feature::Volatility => "Volatility",
        }
    }
}

/// One time step of pre-computed market features. Values that could not be
/// computed are carried as NaN and repaired by the consumer.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow {
    pub date: NaiveDate,
    /// Unscaled close price, the execution price for every trade at this step.
    pub close: f64,
    /// Standard-scaled feature values, fed to the observation vector.
    pub scaled: EnumMap<Feature, f64>,
    /// Raw feature values, used for price/indicator logic.
    pub unscaled: EnumMap<Feature, f64>,
}

/// Coarse trend classification included in the observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketPhase {
    Bull,
    Bear,
    Sideways,
}

impl MarketPhase {
    pub const ALL: [MarketPhase; 3] = [MarketPhase::Bull, MarketPhase::Bear, MarketPhase::Sideways];
}
