use rust_decimal::{Decimal, RoundingStrategy};

/// Normalize an amount to currency precision: two decimal places, half-up.
pub fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Extended total for one order line at a snapshot unit price.
pub fn line_total(quantity: i64, unit_price: Decimal) -> Decimal {
    to_cents(Decimal::from(quantity) * unit_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_half_up() {
        assert_eq!(to_cents(Decimal::new(2345, 3)), Decimal::new(235, 2)); // 2.345 -> 2.35
        assert_eq!(to_cents(Decimal::new(2344, 3)), Decimal::new(234, 2)); // 2.344 -> 2.34
        assert_eq!(to_cents(Decimal::new(120000, 2)), Decimal::new(120000, 2));
    }

    #[test]
    fn test_line_total_is_exact() {
        // 3 x 19.99 = 59.97, no float drift
        let total = line_total(3, Decimal::new(1999, 2));
        assert_eq!(total, Decimal::new(5997, 2));
    }

    #[test]
    fn test_line_total_single_unit() {
        assert_eq!(line_total(1, Decimal::new(15000, 2)), Decimal::new(15000, 2));
    }
}
