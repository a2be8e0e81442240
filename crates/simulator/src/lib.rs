//! # Trade Simulator
//!
//! Stands in for a market data feed: fills the registry with randomly generated trades
//! and assigns random current prices. The metrics engine never depends on this crate;
//! it only sees what ends up in the `Market`.

pub mod error;
pub mod generator;

pub use error::SimulatorError;
pub use generator::TradeGenerator;
