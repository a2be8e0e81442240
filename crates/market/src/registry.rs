use crate::error::MarketError;
use chrono::{DateTime, Utc};
use core_types::{Stock, Trade, TradeAction};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// The exchange's registry of listed stocks and the trades recorded against them.
///
/// Both maps are keyed by stock symbol and always hold the same set of keys: registering
/// a stock creates its (empty) trade book at the same time. Trades are kept in the order
/// they were recorded, which is not necessarily timestamp order.
#[derive(Debug, Clone, Default)]
pub struct Market {
    stocks: BTreeMap<String, Stock>,
    trades: BTreeMap<String, Vec<Trade>>,
}

impl Market {
    /// Creates an empty market.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists a stock, starting it with an empty trade book.
    ///
    /// An existing listing under the same symbol is replaced and its trade history is
    /// discarded. Use [`Market::try_register_stock`] to reject duplicates instead.
    pub fn register_stock(&mut self, stock: Stock) {
        let symbol = stock.symbol.clone();
        if let Some(previous) = self.stocks.insert(symbol.clone(), stock) {
            let discarded = self.trades.get(&symbol).map_or(0, Vec::len);
            tracing::warn!(
                symbol = %symbol,
                discarded_trades = discarded,
                "Re-registered stock {}; previous listing replaced: {:?}",
                symbol,
                previous
            );
        }
        self.trades.insert(symbol, Vec::new());
    }

    /// Lists a stock, failing if the symbol is already registered.
    pub fn try_register_stock(&mut self, stock: Stock) -> Result<(), MarketError> {
        if self.stocks.contains_key(&stock.symbol) {
            return Err(MarketError::DuplicateStock(stock.symbol));
        }
        self.register_stock(stock);
        Ok(())
    }

    /// Appends a trade to the stock's trade book.
    pub fn record_trade(
        &mut self,
        symbol: &str,
        timestamp: DateTime<Utc>,
        quantity: u64,
        price: Decimal,
        action: TradeAction,
    ) -> Result<(), MarketError> {
        let book = self
            .trades
            .get_mut(symbol)
            .ok_or_else(|| MarketError::UnknownStock(symbol.to_string()))?;

        let trade = Trade::new(timestamp, quantity, price, action)?;
        tracing::debug!(symbol = %symbol, ?trade, "Recorded trade");
        book.push(trade);
        Ok(())
    }

    /// Assigns the stock's current price.
    pub fn set_current_price(&mut self, symbol: &str, price: Decimal) -> Result<(), MarketError> {
        let stock = self
            .stocks
            .get_mut(symbol)
            .ok_or_else(|| MarketError::UnknownStock(symbol.to_string()))?;

        stock.set_price(price).map_err(|_| MarketError::InvalidPrice {
            symbol: symbol.to_string(),
            price,
        })
    }

    pub fn stock(&self, symbol: &str) -> Result<&Stock, MarketError> {
        self.stocks
            .get(symbol)
            .ok_or_else(|| MarketError::UnknownStock(symbol.to_string()))
    }

    /// The stock's trades in the order they were recorded.
    pub fn trades(&self, symbol: &str) -> Result<&[Trade], MarketError> {
        self.trades
            .get(symbol)
            .map(Vec::as_slice)
            .ok_or_else(|| MarketError::UnknownStock(symbol.to_string()))
    }

    /// Iterates over all listed stocks in symbol order.
    pub fn stocks(&self) -> impl Iterator<Item = &Stock> {
        self.stocks.values()
    }

    /// Iterates over every stock together with its trade book, in symbol order.
    pub fn listings(&self) -> impl Iterator<Item = (&Stock, &[Trade])> {
        self.stocks.values().zip(self.trades.values().map(Vec::as_slice))
    }

    pub fn symbols(&self) -> Vec<String> {
        self.stocks.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// Total number of trades recorded across all stocks.
    pub fn trade_count(&self) -> usize {
        self.trades.values().map(Vec::len).sum()
    }
}
