//! Money arithmetic using decimal values.
//!
//! Amounts are in US dollars. Prices are never floats; the database column is
//! `NUMERIC(12, 2)` and PayPal receives strings with exactly two decimals.

use rust_decimal::{Decimal, RoundingStrategy};

/// The price a shopper actually pays for one unit.
///
/// A sale price applies only when it is present and strictly positive.
///
/// ```
/// use bazaar_core::effective_price;
/// use rust_decimal::Decimal;
///
/// let price = Decimal::new(2500, 2);
/// assert_eq!(effective_price(price, Some(Decimal::new(1999, 2))), Decimal::new(1999, 2));
/// assert_eq!(effective_price(price, Some(Decimal::ZERO)), price);
/// assert_eq!(effective_price(price, None), price);
/// ```
#[must_use]
pub fn effective_price(price: Decimal, sale_price: Option<Decimal>) -> Decimal {
    match sale_price {
        Some(sale) if sale > Decimal::ZERO => sale,
        _ => price,
    }
}

/// Total for `quantity` units at `unit_price`.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Format an amount with exactly two decimals (`10` becomes `"10.00"`).
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_price_ignores_negative_sale() {
        let price = Decimal::new(1000, 2);
        assert_eq!(effective_price(price, Some(Decimal::new(-1, 0))), price);
    }

    #[test]
    fn test_line_total_is_exact() {
        // 0.1 * 3 must not drift like binary floats do
        assert_eq!(line_total(Decimal::new(1, 1), 3), Decimal::new(3, 1));
        assert_eq!(line_total(Decimal::new(1999, 2), 0), Decimal::ZERO);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(10, 0)), "10.00");
        assert_eq!(format_amount(Decimal::new(5, 1)), "0.50");
        assert_eq!(format_amount(Decimal::new(12345, 3)), "12.35");
        assert_eq!(format_amount(Decimal::new(1999, 2)), "19.99");
    }
}
