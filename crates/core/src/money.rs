//! Minor-unit money arithmetic.
//!
//! All monetary amounts are carried as integer minor units (cents). The only
//! place fractional arithmetic appears is quantity × unit-price, which is
//! rounded half-to-nearest back into cents immediately.

use crate::error::DomainError;

/// Line amount in cents: `quantity × unit_price_cents`, rounded
/// half-to-nearest.
///
/// Quantities are fractional (e.g. 2.5 hours), unit prices are integer cents.
pub fn line_amount_cents(quantity: f64, unit_price_cents: i64) -> i64 {
    (quantity * unit_price_cents as f64).round() as i64
}

/// Validate a line quantity: finite and strictly positive.
pub fn validate_quantity(quantity: f64) -> Result<(), DomainError> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(DomainError::validation(
            "line item quantity must be a positive number",
        ));
    }
    Ok(())
}

/// Validate a unit price: non-negative cents (zero-priced lines are allowed).
pub fn validate_unit_price(unit_price_cents: i64) -> Result<(), DomainError> {
    if unit_price_cents < 0 {
        return Err(DomainError::validation(
            "line item unit price must not be negative",
        ));
    }
    Ok(())
}

/// Checked sum of line amounts.
pub fn checked_total(amounts: impl IntoIterator<Item = i64>) -> Result<i64, DomainError> {
    let mut total: i64 = 0;
    for amount in amounts {
        total = total
            .checked_add(amount)
            .ok_or_else(|| DomainError::validation("amount overflow"))?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_amount_rounds_half_to_nearest() {
        assert_eq!(line_amount_cents(1.0, 100), 100);
        assert_eq!(line_amount_cents(2.5, 101), 253); // 252.5 rounds up
        assert_eq!(line_amount_cents(0.333, 100), 33);
        assert_eq!(line_amount_cents(3.0, 0), 0);
    }

    #[test]
    fn quantity_validation() {
        assert!(validate_quantity(0.25).is_ok());
        assert!(validate_quantity(0.0).is_err());
        assert!(validate_quantity(-1.0).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
        assert!(validate_quantity(f64::INFINITY).is_err());
    }

    #[test]
    fn unit_price_validation() {
        assert!(validate_unit_price(0).is_ok());
        assert!(validate_unit_price(1999).is_ok());
        assert!(validate_unit_price(-1).is_err());
    }

    #[test]
    fn checked_total_sums_and_detects_overflow() {
        assert_eq!(checked_total([100, 200, 300]).unwrap(), 600);
        assert!(checked_total([i64::MAX, 1]).is_err());
    }
}
