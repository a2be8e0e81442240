use core_types::CoreError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("Unknown stock symbol: {0}")]
    UnknownStock(String),

    #[error("Stock symbol {0} is already registered")]
    DuplicateStock(String),

    #[error("Invalid price {price} for stock {symbol}")]
    InvalidPrice { symbol: String, price: Decimal },

    #[error("Invalid trade: {0}")]
    InvalidTrade(#[from] CoreError),
}
