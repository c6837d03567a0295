//! # Money Module
//!
//! Provides the `Money` type for sale amounts and tax.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Form input "24.99" is parsed digit by digit into 2499 cents.         │
//! │    Tax is computed on cents and rounded once more to cents.             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tax Rounding
//! Tax follows `round(round(amount * 100) * rate / 100) / 100`:
//! the amount is first rounded to whole cents (done by the parser), then the
//! percentage is applied and rounded to cents (done by [`Money::calculate_tax`]).
//!
//! ## Usage
//! ```rust
//! use sellerbox_core::money::Money;
//! use sellerbox_core::types::TaxRate;
//!
//! let amount = Money::parse("100").unwrap();
//! let tax = amount.calculate_tax(TaxRate::from_bps(600)); // 6 %
//! assert_eq!(tax.to_string(), "6.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents / kopecks).
///
/// Arithmetic saturates at the `i64` bounds instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use sellerbox_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal string ("1000", "24.99", "24,99") into Money.
    ///
    /// Digits past the second fractional place are rounded half up, which is
    /// the `round(amount * 100)` step of the tax formula done without floats.
    /// A leading `-` is accepted so callers can reject negatives with a
    /// precise error.
    ///
    /// ## Example
    /// ```rust
    /// use sellerbox_core::money::Money;
    ///
    /// assert_eq!(Money::parse("24.99").unwrap().cents(), 2499);
    /// assert_eq!(Money::parse("0.005").unwrap().cents(), 1);
    /// assert!(Money::parse("abc").is_none());
    /// ```
    pub fn parse(input: &str) -> Option<Money> {
        parse_scaled(input, 2).map(Money)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount, rounded half up to whole cents.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5). Callers only pass
    /// non-negative amounts, where this is exactly round-half-up.
    ///
    /// ## Example
    /// ```rust
    /// use sellerbox_core::money::Money;
    /// use sellerbox_core::types::TaxRate;
    ///
    /// let amount = Money::from_cents(249_900); // 2499.00
    /// let tax = amount.calculate_tax(TaxRate::from_bps(600));
    /// assert_eq!(tax.cents(), 14_994); // 149.94
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large amounts from overflowing before the division
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }
}

/// Parses an unsigned-or-negative decimal into an integer scaled by
/// `10^scale`, rounding half up on the first dropped digit.
pub(crate) fn parse_scaled(input: &str, scale: u32) -> Option<i64> {
    let normalized = input.trim().replace(',', ".");
    let (negative, digits) = match normalized.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, normalized.as_str()),
    };

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let multiplier = 10_i64.checked_pow(scale)?;
    let whole_value: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

    let mut fraction_value: i64 = 0;
    let mut fraction_digits = fraction.chars();
    for _ in 0..scale {
        let digit = fraction_digits
            .next()
            .and_then(|c| c.to_digit(10))
            .unwrap_or(0);
        fraction_value = fraction_value * 10 + digit as i64;
    }
    let round_up = fraction_digits
        .next()
        .and_then(|c| c.to_digit(10))
        .is_some_and(|d| d >= 5);

    let magnitude = whole_value
        .checked_mul(multiplier)?
        .checked_add(fraction_value)?
        .checked_add(i64::from(round_up))?;

    Some(if negative { -magnitude } else { magnitude })
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as a plain decimal ("149.94"); currency symbols are a UI concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!(Money::parse("1000").unwrap().cents(), 100_000);
        assert_eq!(Money::parse("24.99").unwrap().cents(), 2499);
        assert_eq!(Money::parse("24,5").unwrap().cents(), 2450);
        assert_eq!(Money::parse(" 7 ").unwrap().cents(), 700);
        assert_eq!(Money::parse(".5").unwrap().cents(), 50);
    }

    #[test]
    fn test_parse_rounds_to_cents() {
        assert_eq!(Money::parse("10.004").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.005").unwrap().cents(), 1001);
        assert_eq!(Money::parse("10.9999").unwrap().cents(), 1100);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_none());
        assert!(Money::parse("abc").is_none());
        assert!(Money::parse("1.2.3").is_none());
        assert!(Money::parse("1e5").is_none());
        assert!(Money::parse(".").is_none());
        assert!(Money::parse("99999999999999999999").is_none());
    }

    #[test]
    fn test_parse_keeps_sign() {
        let money = Money::parse("-5.50").unwrap();
        assert!(money.is_negative());
        assert_eq!(money.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(14_994).to_string(), "149.94");
        assert_eq!(Money::from_cents(600).to_string(), "6.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_tax_on_whole_amount() {
        // 100 at 6 % = 6.00
        let tax = Money::parse("100").unwrap().calculate_tax(TaxRate::from_bps(600));
        assert_eq!(tax.cents(), 600);
    }

    #[test]
    fn test_tax_rounds_after_percentage() {
        // 24.99 at 6 % = 1.4994 → 1.50
        let tax = Money::from_cents(2499).calculate_tax(TaxRate::from_bps(600));
        assert_eq!(tax.cents(), 150);

        // 0.01 at 6 % = 0.0006 → 0.00
        let tax = Money::from_cents(1).calculate_tax(TaxRate::from_bps(600));
        assert!(tax.is_zero());
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 50].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 400);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let big = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!((big + big).cents(), i64::MAX);

        let mut total = big;
        total += big;
        assert_eq!(total.cents(), i64::MAX);

        let total: Money = [big, big, big].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);

        assert_eq!((Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(), i64::MIN);
    }
}
