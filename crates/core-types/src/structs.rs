use crate::enums::{StockType, TradeAction};
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A listed stock and its static dividend attributes.
///
/// Everything except the current price is fixed when the market is set up. The price
/// starts out unset and is assigned later by the price capture step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stock {
    pub symbol: String,
    pub stock_type: StockType,
    pub last_dividend: Decimal,
    /// Fixed dividend as a fraction of par value (0.02 for 2%). Zero for ordinary shares.
    pub fixed_dividend: Decimal,
    pub par_value: Decimal,
    price: Option<Decimal>,
}

impl Stock {
    /// Creates a stock without a current price.
    pub fn new(
        symbol: impl Into<String>,
        stock_type: StockType,
        last_dividend: Decimal,
        fixed_dividend: Decimal,
        par_value: Decimal,
    ) -> Result<Self, CoreError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "symbol".to_string(),
                "must not be empty".to_string(),
            ));
        }
        if last_dividend.is_sign_negative() {
            return Err(CoreError::InvalidInput(
                "last_dividend".to_string(),
                format!("{} is negative", last_dividend),
            ));
        }
        if fixed_dividend.is_sign_negative() {
            return Err(CoreError::InvalidInput(
                "fixed_dividend".to_string(),
                format!("{} is negative", fixed_dividend),
            ));
        }
        if par_value <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "par_value".to_string(),
                format!("{} is not positive", par_value),
            ));
        }

        Ok(Self {
            symbol,
            stock_type,
            last_dividend,
            fixed_dividend,
            par_value,
            price: None,
        })
    }

    /// Builder-style variant of [`Stock::set_price`].
    pub fn with_price(mut self, price: Decimal) -> Result<Self, CoreError> {
        self.set_price(price)?;
        Ok(self)
    }

    /// The current price, if one has been captured.
    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn set_price(&mut self, price: Decimal) -> Result<(), CoreError> {
        if price <= Decimal::ZERO {
            return Err(CoreError::NonPositivePrice(price));
        }
        self.price = Some(price);
        Ok(())
    }
}

/// An executed trade. Trades are never modified once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub quantity: u64,
    pub price: Decimal,
    pub action: TradeAction,
}

impl Trade {
    pub fn new(
        timestamp: DateTime<Utc>,
        quantity: u64,
        price: Decimal,
        action: TradeAction,
    ) -> Result<Self, CoreError> {
        if quantity == 0 {
            return Err(CoreError::InvalidInput(
                "quantity".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if price <= Decimal::ZERO {
            return Err(CoreError::NonPositivePrice(price));
        }
        if price.checked_mul(Decimal::from(quantity)).is_none() {
            return Err(CoreError::InvalidInput(
                "quantity".to_string(),
                format!("{} at {} exceeds the decimal range", quantity, price),
            ));
        }

        Ok(Self {
            trade_id: Uuid::new_v4(),
            timestamp,
            quantity,
            price,
            action,
        })
    }

    /// Price multiplied by quantity, `None` if that leaves the decimal range.
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}
