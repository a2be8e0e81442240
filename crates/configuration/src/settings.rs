use crate::error::ConfigError;
use core_types::{CoreError, Stock, StockType};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub market: MarketSettings,
    #[serde(default)]
    pub simulation: Simulation,
    #[serde(default)]
    pub metrics: Metrics,
}

/// The stocks listed on the exchange at start-up.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketSettings {
    pub stocks: Vec<StockListing>,
}

/// Static attributes of one listed stock.
#[derive(Debug, Clone, Deserialize)]
pub struct StockListing {
    pub symbol: String,
    pub stock_type: StockType,
    pub last_dividend: Decimal,
    /// Fixed dividend as a fraction of par value. Only preferred stock may set it.
    #[serde(default)]
    pub fixed_dividend: Decimal,
    pub par_value: Decimal,
}

impl StockListing {
    /// Builds the (unpriced) `Stock` this listing describes.
    pub fn to_stock(&self) -> Result<Stock, CoreError> {
        Stock::new(
            self.symbol.clone(),
            self.stock_type,
            self.last_dividend,
            self.fixed_dividend,
            self.par_value,
        )
    }
}

/// Contains parameters for the random trade generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Total number of trades generated, spread randomly over all stocks.
    pub trade_count: usize,
    /// Generated trades are stamped within this many minutes before "now".
    pub history_minutes: u32,
    /// Upper bound of the quantity of a generated trade (the lower bound is 1).
    pub max_quantity: u64,
    /// Generated trade and stock prices lie within par value +/- this amount.
    pub price_spread: Decimal,
    /// Seed for the random source. A fresh one is drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            trade_count: 15,
            history_minutes: 30,
            max_quantity: 100,
            price_spread: Decimal::from(20),
            seed: None,
        }
    }
}

/// Parameters of the reported metrics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Metrics {
    /// Trailing window of the volume-weighted stock price.
    pub vwap_window_minutes: u32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            vwap_window_minutes: 15,
        }
    }
}

impl Config {
    /// Checks the settings for values the market or the generator would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.market.stocks.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one stock must be listed".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for listing in &self.market.stocks {
            if !seen.insert(listing.symbol.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "stock {} is listed more than once",
                    listing.symbol
                )));
            }
            if listing.stock_type == StockType::Ordinary && !listing.fixed_dividend.is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "ordinary stock {} cannot have a fixed dividend",
                    listing.symbol
                )));
            }
            listing.to_stock().map_err(|e| {
                ConfigError::ValidationError(format!("stock {}: {}", listing.symbol, e))
            })?;
        }

        if self.simulation.max_quantity == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.max_quantity must be at least 1".to_string(),
            ));
        }
        if self.simulation.price_spread.is_sign_negative() {
            return Err(ConfigError::ValidationError(
                "simulation.price_spread must not be negative".to_string(),
            ));
        }
        if self.simulation.price_spread.normalize().scale() > 2 {
            return Err(ConfigError::ValidationError(format!(
                "simulation.price_spread ({}) must be a whole number of cents",
                self.simulation.price_spread
            )));
        }
        if self.simulation.history_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.history_minutes must be greater than 0".to_string(),
            ));
        }
        if self.metrics.vwap_window_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "metrics.vwap_window_minutes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
