pub mod enums;
pub mod error;
pub mod rounding;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{StockType, TradeAction};
pub use error::CoreError;
pub use rounding::{round_half_up, REPORTING_SCALE};
pub use structs::{Stock, Trade};
