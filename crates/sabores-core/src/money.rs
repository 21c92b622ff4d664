//! # Money Module
//!
//! Provides the `Money` type and the one and only IVA split.
//!
//! ## Why Integer Pesos?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLP HAS NO MINOR UNIT                                                  │
//! │                                                                         │
//! │  Every price in the bakery is a whole number of pesos: $1.200, $800.    │
//! │  Storing them as i64 keeps cart sums exact.                             │
//! │                                                                         │
//! │  Prices are TAX-INCLUSIVE (IVA 19% already inside the shelf price).    │
//! │  The receipt must show the split, so the gross amount is decomposed:   │
//! │                                                                         │
//! │    net = round(gross / 1.19)     tax = gross - net                      │
//! │                                                                         │
//! │  Tax is the remainder, so net + tax == gross ALWAYS.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sabores_core::money::{IvaBreakdown, Money};
//!
//! let gross = Money::from_pesos(3200);
//! let split = IvaBreakdown::from_gross(gross);
//!
//! assert_eq!(split.net.pesos(), 2689);
//! assert_eq!(split.tax.pesos(), 511);
//! assert_eq!(split.net + split.tax, gross);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole Chilean pesos.
///
/// ## Design Decisions
/// - **i64 (signed)**: differences (change due, discrepancies) can be negative
/// - **Single field tuple struct**: serializes as a bare JSON number
/// - **Saturating arithmetic**: a corrupt quantity from the server clamps
///   at the `i64` bounds instead of panicking
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole pesos.
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos)
    }

    /// Returns the value in pesos.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0
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

    /// Multiplies a unit price by a quantity.
    ///
    /// ```rust
    /// use sabores_core::money::Money;
    ///
    /// let unit_price = Money::from_pesos(1200);
    /// assert_eq!(unit_price.multiply_quantity(2).pesos(), 2400);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns `self - other`, clamped at zero.
    ///
    /// Used for change due: handing over less than the total never yields
    /// negative change.
    #[inline]
    pub fn saturating_diff(&self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    /// Extracts the tax-exclusive (net) part of a tax-inclusive amount.
    ///
    /// ## Rounding
    /// `round(gross / (1 + rate))` with halves rounded up, done in integer
    /// arithmetic so every call site gets the same answer:
    ///
    /// ```text
    /// net = floor( (2 · gross · 10000 + d) / (2 · d) )     d = 10000 + bps
    /// ```
    ///
    /// For IVA (1900 bps) this is `floor((200 · gross + 119) / 238)`.
    pub fn net_of(&self, rate: TaxRate) -> Money {
        let divisor = 10_000_i128 + rate.bps() as i128;
        let numerator = 2 * self.0 as i128 * 10_000 + divisor;
        Money(numerator.div_euclid(2 * divisor) as i64)
    }
}

// =============================================================================
// IVA Breakdown
// =============================================================================

/// Net/tax decomposition of a tax-inclusive amount.
///
/// ## Invariant
/// `net + tax == gross`. The tax is never computed on its own; it is what
/// is left after the net has been rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IvaBreakdown {
    /// Tax-exclusive amount.
    pub net: Money,
    /// IVA portion.
    pub tax: Money,
    /// Tax-inclusive amount (what the customer pays).
    pub gross: Money,
}

impl IvaBreakdown {
    /// Splits a gross amount at the Chilean IVA rate (19%).
    pub fn from_gross(gross: Money) -> Self {
        Self::from_gross_at(gross, TaxRate::IVA)
    }

    /// Splits a gross amount at an arbitrary rate.
    pub fn from_gross_at(gross: Money, rate: TaxRate) -> Self {
        let net = gross.net_of(rate);
        IvaBreakdown {
            net,
            tax: gross - net,
            gross,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows pesos the way Chilean receipts do: `$3.200`, `-$1.500`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{}${}", sign, grouped)
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
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
