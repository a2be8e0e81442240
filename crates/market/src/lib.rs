//! # Market Registry
//!
//! Owns the listed stocks and, per stock, the append-only sequence of recorded trades.
//! The registry is plain in-memory state with no synchronisation; writers need `&mut`.

pub mod error;
pub mod registry;

pub use error::MarketError;
pub use registry::Market;
