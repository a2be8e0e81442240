use chrono::{DateTime, Utc};
use core_types::StockType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The metrics of a single stock at the time of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetrics {
    pub symbol: String,
    pub stock_type: StockType,
    pub price: Option<Decimal>,
    pub dividend_yield: Decimal,
    pub pe_ratio: Decimal,
    pub volume_weighted_price: Decimal,
    /// Number of trades recorded for the stock, inside or outside the window.
    pub trade_count: usize,
}

/// A snapshot of every metric the exchange reports.
///
/// This struct is the final output of the `MetricsEngine` and is what the console
/// reporter renders, either as tables or as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketReport {
    pub generated_at: DateTime<Utc>,
    pub window_minutes: u32,
    pub stocks: Vec<StockMetrics>,
    pub all_share_index: Decimal,
}

impl MarketReport {
    pub fn stock(&self, symbol: &str) -> Option<&StockMetrics> {
        self.stocks.iter().find(|metrics| metrics.symbol == symbol)
    }
}
