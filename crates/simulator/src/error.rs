use market::MarketError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Simulation parameters are invalid: {0}")]
    InvalidParameters(String),

    #[error("Cannot generate trades: no stocks are listed")]
    EmptyMarket,

    #[error("Failed to record generated data: {0}")]
    Market(#[from] MarketError),
}
