//! Type-safe price representation using decimal arithmetic.
//!
//! The shop sells in Chilean pesos, which have no minor unit in practice:
//! prices are displayed rounded to whole pesos with `.` as the thousands
//! separator (`$1.500`).

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in Chilean pesos.
    #[must_use]
    pub const fn clp(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::CLP)
    }

    /// A zero amount in the default currency.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(Decimal::ZERO, CurrencyCode::CLP)
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// The price of `quantity` units.
    ///
    /// Returns `None` if the product overflows.
    #[must_use]
    pub fn checked_times(&self, quantity: i64) -> Option<Self> {
        self.amount
            .checked_mul(Decimal::from(quantity))
            .map(|amount| Self::new(amount, self.currency_code))
    }

    /// Add two prices of the same currency.
    ///
    /// Returns `None` when the currencies differ or the sum overflows.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if self.currency_code != other.currency_code {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Self::new(amount, self.currency_code))
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.currency_code {
            CurrencyCode::CLP => {
                let rounded = self
                    .amount
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
                let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
                    "-"
                } else {
                    ""
                };
                let digits = rounded.abs().trunc().to_string();
                write!(f, "{sign}${}", group_thousands(&digits, '.'))
            }
            code => write!(f, "{} {:.2}", code.as_str(), self.amount),
        }
    }
}

/// Insert `separator` every three digits from the right.
fn group_thousands(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    CLP,
    USD,
    EUR,
}

impl CurrencyCode {
    /// The ISO 4217 code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CLP => "CLP",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn clp(amount: i64) -> Price {
        Price::clp(Decimal::from(amount))
    }

    #[test]
    fn test_display_clp_groups_thousands() {
        assert_eq!(clp(0).to_string(), "$0");
        assert_eq!(clp(990).to_string(), "$990");
        assert_eq!(clp(1500).to_string(), "$1.500");
        assert_eq!(clp(12_990).to_string(), "$12.990");
        assert_eq!(clp(1_234_567).to_string(), "$1.234.567");
    }

    #[test]
    fn test_display_clp_rounds_to_whole_pesos() {
        assert_eq!(Price::clp(Decimal::new(14_995, 1)).to_string(), "$1.500");
        assert_eq!(Price::clp(Decimal::new(14_994, 1)).to_string(), "$1.499");
    }

    #[test]
    fn test_display_other_currency() {
        let price = Price::new(Decimal::new(1999, 2), CurrencyCode::USD);
        assert_eq!(price.to_string(), "USD 19.99");
    }

    #[test]
    fn test_times_and_add() {
        let line = clp(1500).checked_times(3).unwrap();
        assert_eq!(line, clp(4500));
        assert_eq!(line.checked_add(&clp(500)), Some(clp(5000)));
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        let max = Price::clp(Decimal::MAX);
        assert_eq!(max.checked_times(2), None);
        assert_eq!(max.checked_times(1), Some(max));
        assert_eq!(max.checked_add(&clp(1)), None);
    }

    #[test]
    fn test_checked_add_rejects_mixed_currency() {
        let usd = Price::new(Decimal::ONE, CurrencyCode::USD);
        assert_eq!(clp(1).checked_add(&usd), None);
    }

    #[test]
    fn test_is_negative() {
        assert!(clp(-1).is_negative());
        assert!(!clp(0).is_negative());
        assert!(!clp(10).is_negative());
    }
}
