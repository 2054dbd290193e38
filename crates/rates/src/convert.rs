//! Reference-currency conversion.
//!
//! Rates are expressed as units of a currency per one reference-currency
//! unit (USD). Conversions round half-to-nearest at each step and are lossy
//! under round-tripping; a missing rate degrades the amount to zero so that
//! aggregation excludes it instead of failing.

use ledgerly_core::CurrencyCode;

/// Read-only view over the rate table.
///
/// Implemented by the infra rate store; kept as a trait so conversion stays
/// storage-agnostic and trivially testable.
pub trait RateProvider {
    /// Units of `currency` per one reference-currency unit, if known.
    ///
    /// The reference currency itself is defined as 1 and need not be stored.
    fn rate(&self, currency: &CurrencyCode) -> Option<f64>;
}

impl<P: RateProvider + ?Sized> RateProvider for &P {
    fn rate(&self, currency: &CurrencyCode) -> Option<f64> {
        (**self).rate(currency)
    }
}

impl<P: RateProvider + ?Sized> RateProvider for std::sync::Arc<P> {
    fn rate(&self, currency: &CurrencyCode) -> Option<f64> {
        (**self).rate(currency)
    }
}

fn usable_rate(currency: &CurrencyCode, rates: &impl RateProvider) -> Option<f64> {
    if currency.is_reference() {
        return Some(1.0);
    }
    rates.rate(currency).filter(|r| r.is_finite() && *r > 0.0)
}

/// Convert minor units of `currency` into reference-currency minor units.
///
/// Missing (or unusable) rate ⇒ 0: the amount is excluded from totals, not
/// an error.
pub fn to_reference(amount_cents: i64, currency: &CurrencyCode, rates: &impl RateProvider) -> i64 {
    match usable_rate(currency, rates) {
        Some(rate) => (amount_cents as f64 / rate).round() as i64,
        None => 0,
    }
}

/// Convert reference-currency minor units into `currency` minor units.
pub fn from_reference(
    amount_cents_usd: i64,
    currency: &CurrencyCode,
    rates: &impl RateProvider,
) -> i64 {
    match usable_rate(currency, rates) {
        Some(rate) => (amount_cents_usd as f64 * rate).round() as i64,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapRates(HashMap<&'static str, f64>);

    impl RateProvider for MapRates {
        fn rate(&self, currency: &CurrencyCode) -> Option<f64> {
            self.0.get(currency.as_str()).copied()
        }
    }

    fn rates() -> MapRates {
        MapRates(HashMap::from([("AUD", 1.6), ("INR", 83.0), ("BAD", 0.0)]))
    }

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn reference_currency_is_identity() {
        assert_eq!(to_reference(12345, &code("USD"), &rates()), 12345);
        assert_eq!(from_reference(12345, &code("USD"), &rates()), 12345);
    }

    #[test]
    fn converts_through_the_rate() {
        // 160 AUD cents at 1.6 AUD/USD = 100 USD cents.
        assert_eq!(to_reference(160, &code("AUD"), &rates()), 100);
        assert_eq!(from_reference(100, &code("AUD"), &rates()), 160);
    }

    #[test]
    fn rounds_half_to_nearest() {
        // 100 / 83 = 1.204...; 125 / 83 = 1.506...
        assert_eq!(to_reference(100, &code("INR"), &rates()), 1);
        assert_eq!(to_reference(125, &code("INR"), &rates()), 2);
    }

    #[test]
    fn missing_rate_degrades_to_zero() {
        assert_eq!(to_reference(99999, &code("XYZ"), &rates()), 0);
        assert_eq!(from_reference(99999, &code("XYZ"), &rates()), 0);
    }

    #[test]
    fn non_positive_rate_degrades_to_zero() {
        assert_eq!(to_reference(500, &code("BAD"), &rates()), 0);
        assert_eq!(from_reference(500, &code("BAD"), &rates()), 0);
    }

    #[test]
    fn round_trip_is_lossy_not_exact() {
        let inr = code("INR");
        let usd_cents = to_reference(100, &inr, &rates()); // 1
        let back = from_reference(usd_cents, &inr, &rates()); // 83
        assert_ne!(back, 100);
        assert_eq!(back, 83);
    }
}
