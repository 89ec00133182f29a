//! Signed monetary amount in minor units.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Signed amount in the smallest currency unit (e.g. cents).
///
/// Single-currency by construction. Arithmetic is checked: overflow surfaces
/// as a [`DomainError::InvariantViolation`] instead of wrapping.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    const MINOR_PER_MAJOR: i64 = 100;

    /// Amount from minor units (cents).
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Amount from major units (e.g. dollars), for literals and fixtures.
    ///
    /// Saturates at the `i64` bounds; use [`Money::checked_from_major`] for
    /// values that come from input.
    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(Self::MINOR_PER_MAJOR))
    }

    pub fn checked_from_major(major: i64) -> DomainResult<Self> {
        major
            .checked_mul(Self::MINOR_PER_MAJOR)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("amount overflow"))
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Money) -> DomainResult<Money> {
        self.0
            .checked_add(rhs.0)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("balance overflow"))
    }

    pub fn checked_sub(self, rhs: Money) -> DomainResult<Money> {
        self.0
            .checked_sub(rhs.0)
            .map(Money)
            .ok_or_else(|| DomainError::invariant("balance overflow"))
    }

    /// Rejects negative amounts; deposits and withdrawals only move
    /// non-negative quantities.
    pub fn ensure_non_negative(self) -> DomainResult<Money> {
        if self.is_negative() {
            return Err(DomainError::validation(format!(
                "amount must not be negative (got {self})"
            )));
        }
        Ok(self)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = Self::MINOR_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per, abs % per)
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Self(minor)
    }
}
