//! Domain error model.

use thiserror::Error;

use crate::id::{AccountId, BankId, UserId};
use crate::money::Money;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure is terminal for the call that produced it and leaves all
/// balances untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A withdrawal exceeded the balance of an account that disallows overdraft.
    #[error("insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: Money,
        requested: Money,
    },

    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    #[error("bank not found: {0}")]
    BankNotFound(BankId),

    /// A user with an empty account list took part in a transfer.
    #[error("user {0} has no accounts")]
    NoAccounts(UserId),

    /// Generic registry miss; the key is rendered with `Display`.
    #[error("not found: {0}")]
    NotFound(String),

    /// A value failed validation (e.g. a negative amount).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant would be violated (e.g. balance overflow).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(key: impl core::fmt::Display) -> Self {
        Self::NotFound(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_message_names_amounts() {
        let account = AccountId::new();
        let err = DomainError::InsufficientFunds {
            account,
            balance: Money::from_major(200),
            requested: Money::from_major(300),
        };

        let msg = err.to_string();
        assert!(msg.contains(&account.to_string()));
        assert!(msg.contains("200.00"));
        assert!(msg.contains("300.00"));
    }
}
