use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places every reported figure is rounded to.
pub const REPORTING_SCALE: u32 = 2;

/// Rounds to two decimal places, ties away from zero ("half up").
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(REPORTING_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(round_half_up(dec!(2.345)), dec!(2.35));
        assert_eq!(round_half_up(dec!(2.355)), dec!(2.36));
        assert_eq!(round_half_up(dec!(-2.345)), dec!(-2.35));
    }

    #[test]
    fn test_below_midpoint_rounds_down() {
        assert_eq!(round_half_up(dec!(0.0764)), dec!(0.08));
        assert_eq!(round_half_up(dec!(0.0744)), dec!(0.07));
    }
}
