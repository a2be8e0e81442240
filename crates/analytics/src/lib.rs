//! # Stock Market Analytics
//!
//! This crate computes the exchange's financial metrics: dividend yield, P/E ratio,
//! volume-weighted stock price and the all-share index.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** It depends only on `core-types` and the `market` registry, which it
//!   reads but never mutates.
//! - **Stateless Calculation:** The `MetricsEngine` holds no state. The volume-weighted
//!   price takes its reference time as an argument instead of reading the clock, so every
//!   metric is a deterministic function of its inputs.
//! - **No data is not an error:** an empty trade window, a zero dividend or a market with
//!   no trades produce zero. A missing current price is an `InvalidState` error.
//!
//! ## Public API
//!
//! - `MetricsEngine`: The calculator.
//! - `MarketReport` / `StockMetrics`: All metrics for a market at a point in time.
//! - `AnalyticsError`: The error types that can be returned from this crate.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::MetricsEngine;
pub use error::AnalyticsError;
pub use report::{MarketReport, StockMetrics};
