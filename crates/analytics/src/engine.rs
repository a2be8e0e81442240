use crate::error::AnalyticsError;
use crate::report::{MarketReport, StockMetrics};
use chrono::{DateTime, Duration, Utc};
use core_types::{round_half_up, Stock, StockType, Trade};
use market::Market;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// A stateless calculator for the exchange's stock and market metrics.
///
/// Every figure is computed in fixed-point decimal and rounded to two places, half up.
/// The single exception is the n-th root inside the all-share index, which is taken in
/// `f64` before the result is converted back.
#[derive(Debug, Default)]
pub struct MetricsEngine {}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dividend yield at the stock's current price.
    ///
    /// * Ordinary shares: `last_dividend / price`
    /// * Preferred shares: `fixed_dividend * par_value / price`
    ///
    /// Fails with `InvalidState` if no current price has been captured.
    pub fn dividend_yield(&self, stock: &Stock) -> Result<Decimal, AnalyticsError> {
        let price = current_price(stock, "dividend yield")?;

        let dividend = match stock.stock_type {
            StockType::Ordinary => stock.last_dividend,
            StockType::Preferred => stock.fixed_dividend * stock.par_value,
        };

        let dividend_yield = round_half_up(dividend / price);
        tracing::debug!(symbol = %stock.symbol, %dividend, %price, %dividend_yield, "Dividend yield");
        Ok(dividend_yield)
    }

    /// Price/earnings ratio, with the last dividend standing in for earnings.
    ///
    /// A stock that paid no dividend has a ratio of zero. That check comes before the
    /// price check, so such a stock does not need a current price.
    pub fn pe_ratio(&self, stock: &Stock) -> Result<Decimal, AnalyticsError> {
        if stock.last_dividend.is_zero() {
            return Ok(Decimal::ZERO);
        }
        let price = current_price(stock, "P/E ratio")?;

        let ratio = round_half_up(price / stock.last_dividend);
        tracing::debug!(symbol = %stock.symbol, %price, %ratio, "P/E ratio");
        Ok(ratio)
    }

    /// Volume-weighted price of the trades made during the `window_minutes` before `at`.
    ///
    /// The start of the window is exclusive: a trade stamped exactly `window_minutes`
    /// before `at` does not count. Trades after `at` are not filtered out. With no
    /// volume in the window the result is zero.
    ///
    /// Fails with `Calculation` if the traded value leaves the decimal range.
    pub fn volume_weighted_stock_price(
        &self,
        symbol: &str,
        trades: &[Trade],
        at: DateTime<Utc>,
        window_minutes: u32,
    ) -> Result<Decimal, AnalyticsError> {
        let window_start = at
            .checked_sub_signed(Duration::minutes(i64::from(window_minutes)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let (traded_value, traded_quantity) = trades
            .iter()
            .filter(|trade| trade.timestamp > window_start)
            .try_fold((Decimal::ZERO, Decimal::ZERO), |(value, quantity), trade| {
                Some((
                    value.checked_add(trade.notional()?)?,
                    quantity.checked_add(Decimal::from(trade.quantity))?,
                ))
            })
            .ok_or_else(|| {
                AnalyticsError::Calculation(format!("Traded value of {} overflowed", symbol))
            })?;

        if traded_quantity.is_zero() {
            tracing::debug!(symbol = %symbol, %window_start, "No trades in window");
            return Ok(Decimal::ZERO);
        }

        let vwap = round_half_up(traded_value / traded_quantity);
        tracing::debug!(symbol = %symbol, %traded_value, %traded_quantity, %vwap, "Volume-weighted price");
        Ok(vwap)
    }

    /// [`MetricsEngine::volume_weighted_stock_price`] over the trade book held by `market`.
    pub fn volume_weighted_stock_price_in(
        &self,
        market: &Market,
        symbol: &str,
        at: DateTime<Utc>,
        window_minutes: u32,
    ) -> Result<Decimal, AnalyticsError> {
        let trades = market.trades(symbol)?;
        self.volume_weighted_stock_price(symbol, trades, at, window_minutes)
    }

    /// Geometric mean of the latest traded price of every stock that has traded.
    ///
    /// "Latest" means the last trade recorded, not the one with the newest timestamp.
    /// Stocks without trades are left out; if none has traded the index is zero.
    ///
    /// The mean is taken as `exp(sum(ln p) / n)` in `f64`, so the size of the market
    /// never overflows the product.
    pub fn all_share_index(&self, market: &Market) -> Result<Decimal, AnalyticsError> {
        let mut log_sum = 0.0_f64;
        let mut contributors: u32 = 0;

        for (stock, trades) in market.listings() {
            let Some(latest) = trades.last() else {
                continue;
            };
            let price = latest.price.to_f64().ok_or_else(|| {
                AnalyticsError::Calculation(format!(
                    "Cannot convert latest price {} of {} to f64",
                    latest.price, stock.symbol
                ))
            })?;
            log_sum += price.ln();
            contributors += 1;
        }

        if contributors == 0 {
            return Ok(Decimal::ZERO);
        }

        let root = (log_sum / f64::from(contributors)).exp();
        let index = Decimal::from_f64(root).ok_or_else(|| {
            AnalyticsError::Calculation(format!("Geometric mean {} is not representable", root))
        })?;

        let index = round_half_up(index);
        tracing::debug!(contributors, %index, "All-share index");
        Ok(index)
    }

    /// Computes every metric for every listed stock, plus the all-share index.
    pub fn report(
        &self,
        market: &Market,
        at: DateTime<Utc>,
        window_minutes: u32,
    ) -> Result<MarketReport, AnalyticsError> {
        let stocks = market
            .listings()
            .map(|(stock, trades)| -> Result<StockMetrics, AnalyticsError> {
                Ok(StockMetrics {
                    symbol: stock.symbol.clone(),
                    stock_type: stock.stock_type,
                    price: stock.price(),
                    dividend_yield: self.dividend_yield(stock)?,
                    pe_ratio: self.pe_ratio(stock)?,
                    volume_weighted_price: self.volume_weighted_stock_price(
                        &stock.symbol,
                        trades,
                        at,
                        window_minutes,
                    )?,
                    trade_count: trades.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MarketReport {
            generated_at: at,
            window_minutes,
            stocks,
            all_share_index: self.all_share_index(market)?,
        })
    }
}

/// The stock's current price, which the price-based metrics cannot do without.
fn current_price(stock: &Stock, metric: &'static str) -> Result<Decimal, AnalyticsError> {
    match stock.price() {
        Some(price) if price > Decimal::ZERO => Ok(price),
        Some(price) => Err(AnalyticsError::InvalidState {
            symbol: stock.symbol.clone(),
            metric,
            reason: format!("current price {} is not positive", price),
        }),
        None => Err(AnalyticsError::InvalidState {
            symbol: stock.symbol.clone(),
            metric,
            reason: "current price is not set".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::TradeAction;
    use rust_decimal_macros::dec;

    fn stock(symbol: &str, stock_type: StockType, last: Decimal, fixed: Decimal) -> Stock {
        Stock::new(symbol, stock_type, last, fixed, dec!(100)).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 9, 16, 48, 31).unwrap()
    }

    fn trade(minutes_ago: i64, quantity: u64, price: Decimal) -> Trade {
        Trade::new(now() - Duration::minutes(minutes_ago), quantity, price, TradeAction::Buy).unwrap()
    }

    #[test]
    fn test_ordinary_dividend_yield() {
        let engine = MetricsEngine::new();
        let mil = stock("MIL", StockType::Ordinary, dec!(8), dec!(0))
            .with_price(dec!(104.65))
            .unwrap();
        assert_eq!(engine.dividend_yield(&mil).unwrap(), dec!(0.08));
    }

    #[test]
    fn test_preferred_dividend_yield_uses_fixed_dividend() {
        let engine = MetricsEngine::new();
        let cof = stock("COF", StockType::Preferred, dec!(8), dec!(0.04))
            .with_price(dec!(106.34))
            .unwrap();
        // 0.04 * 100 / 106.34 = 0.0376...
        assert_eq!(engine.dividend_yield(&cof).unwrap(), dec!(0.04));
    }

    #[test]
    fn test_dividend_yield_without_price_is_invalid_state() {
        let engine = MetricsEngine::new();
        let mil = stock("MIL", StockType::Ordinary, dec!(8), dec!(0));
        let err = engine.dividend_yield(&mil).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidState { symbol, .. } if symbol == "MIL"));
    }

    #[test]
    fn test_pe_ratio_is_zero_without_dividend() {
        let engine = MetricsEngine::new();
        for price in [dec!(0.01), dec!(93.56), dec!(10000)] {
            let tea = stock("TEA", StockType::Ordinary, dec!(0), dec!(0))
                .with_price(price)
                .unwrap();
            assert_eq!(engine.pe_ratio(&tea).unwrap(), Decimal::ZERO);
        }
        // No price needed either.
        let unpriced = stock("TEA", StockType::Ordinary, dec!(0), dec!(0));
        assert_eq!(engine.pe_ratio(&unpriced).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_pe_ratio() {
        let engine = MetricsEngine::new();
        let cof = stock("COF", StockType::Preferred, dec!(8), dec!(0.04))
            .with_price(dec!(106.34))
            .unwrap();
        assert_eq!(engine.pe_ratio(&cof).unwrap(), dec!(13.29));

        let unpriced = stock("COF", StockType::Preferred, dec!(8), dec!(0.04));
        assert!(engine.pe_ratio(&unpriced).is_err());
    }

    #[test]
    fn test_vwap_two_trades_in_window() {
        let engine = MetricsEngine::new();
        let trades = vec![trade(14, 10, dec!(100)), trade(10, 15, dec!(86.57))];
        // (1000 + 1298.55) / 25 = 91.942
        assert_eq!(
            engine.volume_weighted_stock_price("TEA", &trades, now(), 15).unwrap(),
            dec!(91.94)
        );
    }

    #[test]
    fn test_vwap_empty_window_is_zero() {
        let engine = MetricsEngine::new();
        let trades = vec![trade(20, 33, dec!(264.54)), trade(19, 54, dec!(243.12))];
        assert_eq!(
            engine.volume_weighted_stock_price("WAT", &trades, now(), 15).unwrap(),
            Decimal::ZERO
        );
        assert_eq!(
            engine.volume_weighted_stock_price("WAT", &[], now(), 15).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_vwap_window_start_is_exclusive() {
        let engine = MetricsEngine::new();
        let trades = vec![trade(15, 100, dec!(50)), trade(5, 10, dec!(120))];
        assert_eq!(
            engine.volume_weighted_stock_price("JUI", &trades, now(), 15).unwrap(),
            dec!(120)
        );
    }

    #[test]
    fn test_vwap_is_pure() {
        let engine = MetricsEngine::new();
        let trades = vec![trade(3, 7, dec!(10.005)), trade(2, 3, dec!(11.11))];
        let first = engine.volume_weighted_stock_price("JUI", &trades, now(), 15).unwrap();
        let second = engine.volume_weighted_stock_price("JUI", &trades, now(), 15).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_vwap_overflow_is_a_calculation_error() {
        let engine = MetricsEngine::new();
        // Each notional fits in a Decimal, their sum does not.
        let trades = vec![
            trade(2, u64::MAX, dec!(2500000000)),
            trade(1, u64::MAX, dec!(2500000000)),
        ];
        let err = engine
            .volume_weighted_stock_price("WAT", &trades, now(), 15)
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Calculation(msg) if msg.contains("WAT")));

        assert_eq!(
            engine.volume_weighted_stock_price("WAT", &trades[..1], now(), 15).unwrap(),
            dec!(2500000000)
        );
    }

    #[test]
    fn test_all_share_index_empty_market() {
        let engine = MetricsEngine::new();
        assert_eq!(engine.all_share_index(&Market::new()).unwrap(), Decimal::ZERO);

        let mut market = Market::new();
        market.register_stock(stock("TEA", StockType::Ordinary, dec!(0), dec!(0)));
        assert_eq!(engine.all_share_index(&market).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_all_share_index_uses_last_recorded_trade() {
        let engine = MetricsEngine::new();
        let mut market = Market::new();
        market.register_stock(stock("TEA", StockType::Ordinary, dec!(0), dec!(0)));
        market.register_stock(stock("POP", StockType::Ordinary, dec!(8), dec!(0)));

        // Recorded last but stamped earliest: still the one used.
        market.record_trade("TEA", now(), 1, dec!(50), TradeAction::Buy).unwrap();
        market
            .record_trade("TEA", now() - Duration::minutes(10), 1, dec!(4), TradeAction::Sell)
            .unwrap();
        market.record_trade("POP", now(), 1, dec!(16), TradeAction::Buy).unwrap();

        // sqrt(4 * 16) = 8
        assert_eq!(engine.all_share_index(&market).unwrap(), dec!(8));
    }

    #[test]
    fn test_all_share_index_over_many_stocks() {
        let engine = MetricsEngine::new();
        let mut market = Market::new();
        for n in 0..20 {
            let symbol = format!("S{:02}", n);
            market.register_stock(stock(&symbol, StockType::Ordinary, dec!(1), dec!(0)));
            market.record_trade(&symbol, now(), 10, dec!(100), TradeAction::Buy).unwrap();
        }
        // The product, 100^20, is far beyond the decimal range.
        assert_eq!(engine.all_share_index(&market).unwrap(), dec!(100.00));

        market.register_stock(stock("BIG", StockType::Ordinary, dec!(1), dec!(0)));
        market.record_trade("BIG", now(), 1, dec!(1000000), TradeAction::Buy).unwrap();
        market.register_stock(stock("LOW", StockType::Ordinary, dec!(1), dec!(0)));
        market.record_trade("LOW", now(), 1, dec!(0.01), TradeAction::Buy).unwrap();
        // 1e6 * 1e-2 = 1e4 = 100^2, so the mean is unchanged.
        assert_eq!(engine.all_share_index(&market).unwrap(), dec!(100.00));
    }

    #[test]
    fn test_report_requires_prices() {
        let engine = MetricsEngine::new();
        let mut market = Market::new();
        market.register_stock(stock("MIL", StockType::Ordinary, dec!(8), dec!(0)));

        assert!(matches!(
            engine.report(&market, now(), 15),
            Err(AnalyticsError::InvalidState { .. })
        ));

        market.set_current_price("MIL", dec!(104.65)).unwrap();
        let report = engine.report(&market, now(), 15).unwrap();
        assert_eq!(report.stocks.len(), 1);
        assert_eq!(report.stocks[0].dividend_yield, dec!(0.08));
        assert_eq!(report.stocks[0].pe_ratio, dec!(13.08));
        assert_eq!(report.all_share_index, Decimal::ZERO);
    }

    #[test]
    fn test_vwap_in_market_unknown_symbol() {
        let engine = MetricsEngine::new();
        let err = engine
            .volume_weighted_stock_price_in(&Market::new(), "XYZ", now(), 15)
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Market(_)));
    }
}
