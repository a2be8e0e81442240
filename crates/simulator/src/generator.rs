use crate::error::SimulatorError;
use chrono::{DateTime, Duration, Utc};
use configuration::Simulation;
use core_types::TradeAction;
use market::Market;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Generated prices never fall below one cent.
const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Feeds a market with random trades and current prices.
///
/// All randomness comes from the injected `R`, so a seeded generator replays the same
/// trades for the same market and reference time.
#[derive(Debug, Clone)]
pub struct TradeGenerator<R: Rng = StdRng> {
    params: Simulation,
    /// `price_spread` in whole cents.
    spread_cents: i64,
    rng: R,
}

impl TradeGenerator<StdRng> {
    /// Creates a generator whose random source is seeded with `seed`.
    pub fn seeded(params: Simulation, seed: u64) -> Result<Self, SimulatorError> {
        Self::new(params, StdRng::seed_from_u64(seed))
    }

    /// Creates a generator seeded from the operating system.
    pub fn from_entropy(params: Simulation) -> Result<Self, SimulatorError> {
        Self::new(params, StdRng::from_entropy())
    }

    /// Uses `params.seed` when present, entropy otherwise.
    pub fn from_params(params: Simulation) -> Result<Self, SimulatorError> {
        match params.seed {
            Some(seed) => Self::seeded(params, seed),
            None => Self::from_entropy(params),
        }
    }
}

impl<R: Rng> TradeGenerator<R> {
    pub fn new(params: Simulation, rng: R) -> Result<Self, SimulatorError> {
        if params.max_quantity == 0 {
            return Err(SimulatorError::InvalidParameters(
                "max_quantity must be at least 1".to_string(),
            ));
        }
        if params.history_minutes == 0 {
            return Err(SimulatorError::InvalidParameters(
                "history_minutes must be greater than 0".to_string(),
            ));
        }
        if params.price_spread.is_sign_negative() {
            return Err(SimulatorError::InvalidParameters(format!(
                "price_spread ({}) must not be negative",
                params.price_spread
            )));
        }
        if params.price_spread.normalize().scale() > 2 {
            return Err(SimulatorError::InvalidParameters(format!(
                "price_spread ({}) must be a whole number of cents",
                params.price_spread
            )));
        }
        let spread_cents = (params.price_spread * Decimal::ONE_HUNDRED)
            .to_i64()
            .ok_or_else(|| {
                SimulatorError::InvalidParameters(format!(
                    "price_spread ({}) is too large",
                    params.price_spread
                ))
            })?;

        Ok(Self {
            params,
            spread_cents,
            rng,
        })
    }

    pub fn params(&self) -> &Simulation {
        &self.params
    }

    /// Records `trade_count` random trades spread over the market's stocks.
    ///
    /// Each trade picks a stock uniformly, a quantity in `1..=max_quantity`, a price
    /// within `price_spread` of the stock's par value and a side. Its timestamp falls in
    /// the `history_minutes` before `now`, at whole-second offsets.
    ///
    /// Returns the number of trades recorded.
    pub fn capture_trades(
        &mut self,
        market: &mut Market,
        now: DateTime<Utc>,
    ) -> Result<usize, SimulatorError> {
        if self.params.trade_count == 0 {
            return Ok(0);
        }
        let symbols = market.symbols();
        if symbols.is_empty() {
            return Err(SimulatorError::EmptyMarket);
        }

        let history_start = now - Duration::minutes(i64::from(self.params.history_minutes));
        let history_seconds = i64::from(self.params.history_minutes) * 60;

        for _ in 0..self.params.trade_count {
            let symbol = symbols
                .choose(&mut self.rng)
                .ok_or(SimulatorError::EmptyMarket)?;
            let par_value = market.stock(symbol)?.par_value;

            let quantity = self.rng.gen_range(1..=self.params.max_quantity);
            let price = self.random_price(par_value);
            let action = if self.rng.gen_bool(0.5) {
                TradeAction::Buy
            } else {
                TradeAction::Sell
            };
            let timestamp = history_start + Duration::seconds(self.rng.gen_range(0..history_seconds));

            market.record_trade(symbol, timestamp, quantity, price, action)?;
        }

        tracing::info!(
            trades = self.params.trade_count,
            stocks = symbols.len(),
            history_minutes = self.params.history_minutes,
            "Captured random trades"
        );
        Ok(self.params.trade_count)
    }

    /// Assigns every stock a random current price within `price_spread` of its par value.
    pub fn capture_stock_prices(&mut self, market: &mut Market) -> Result<(), SimulatorError> {
        for symbol in market.symbols() {
            let par_value = market.stock(&symbol)?.par_value;
            let price = self.random_price(par_value);
            tracing::debug!(symbol = %symbol, %price, "Captured stock price");
            market.set_current_price(&symbol, price)?;
        }
        Ok(())
    }

    /// A price in cents within `par_value +/- price_spread`, floored at one cent.
    fn random_price(&mut self, par_value: Decimal) -> Decimal {
        let offset_cents = self.rng.gen_range(-self.spread_cents..=self.spread_cents);
        (par_value + Decimal::new(offset_cents, 2)).max(MIN_PRICE)
    }
}
