use market::MarketError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Cannot calculate {metric} for {symbol}: {reason}")]
    InvalidState {
        symbol: String,
        metric: &'static str,
        reason: String,
    },

    #[error("Error in calculation: {0}")]
    Calculation(String),

    #[error(transparent)]
    Market(#[from] MarketError),
}
