//! Canned banks, users and accounts for test scenarios.

use std::sync::Arc;

use minibank_core::{AccountId, Money, UserId};

use crate::bank::{Bank, BankOptions};
use crate::registry::InMemoryDirectory;
use crate::user::User;

/// The standard two-bank scenario:
///
/// - `bank` (no overdraft): Alice 1000.00, Bob 500.00
/// - `bank_allows_negative` (overdraft): Alice 200.00
///
/// Alice's primary account is the one in `bank`. Both banks and both users are
/// registered in `directory`.
#[derive(Debug)]
pub struct Fixtures {
    pub directory: InMemoryDirectory,
    pub bank: Arc<Bank>,
    pub bank_allows_negative: Arc<Bank>,
    pub alice: Arc<User>,
    pub bob: Arc<User>,
    pub alice_account_id: AccountId,
    pub alice_account_allows_negative_id: AccountId,
    pub bob_account_id: AccountId,
}

impl Fixtures {
    pub fn new() -> Self {
        Self::build(InMemoryDirectory::new())
    }

    /// Build the scenario into `directory`, clearing whatever it held first.
    pub fn build(directory: InMemoryDirectory) -> Self {
        directory.clear();

        let bank = directory.register_bank(Bank::new(BankOptions::default()));
        let bank_allows_negative =
            directory.register_bank(Bank::new(BankOptions::allowing_overdraft()));

        let alice_account_id = bank.create_account(Money::from_major(1000)).id_typed();
        let alice_account_allows_negative_id = bank_allows_negative
            .create_account(Money::from_major(200))
            .id_typed();
        let bob_account_id = bank.create_account(Money::from_major(500)).id_typed();

        let alice = directory.register_user(User::new(
            "Alice",
            vec![alice_account_id, alice_account_allows_negative_id],
        ));
        let bob = directory.register_user(User::new("Bob", vec![bob_account_id]));

        Self {
            directory,
            bank,
            bank_allows_negative,
            alice,
            bob,
            alice_account_id,
            alice_account_allows_negative_id,
            bob_account_id,
        }
    }

    pub fn alice_id(&self) -> UserId {
        self.alice.id_typed()
    }

    pub fn bob_id(&self) -> UserId {
        self.bob.id_typed()
    }

    /// A new bank, registered in the fixture directory.
    pub fn create_bank(&self, options: BankOptions) -> Arc<Bank> {
        self.directory.register_bank(Bank::new(options))
    }

    /// A new user, registered in the fixture directory.
    pub fn create_user(&self, name: &str, account_ids: Vec<AccountId>) -> Arc<User> {
        self.directory.register_user(User::new(name, account_ids))
    }
}

impl Default for Fixtures {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Directory;

    #[test]
    fn build_clears_the_directory_first() {
        let directory = InMemoryDirectory::new();
        let stale = directory.register_user(User::new("Stale", vec![]));

        let fx = Fixtures::build(directory);

        assert!(fx.directory.user(&stale.id_typed()).is_err());
        assert_eq!(fx.directory.users().len(), 2);
        assert_eq!(fx.directory.banks().len(), 2);
    }

    #[test]
    fn alice_primary_is_in_the_strict_bank() {
        let fx = Fixtures::new();
        assert_eq!(fx.alice.primary_account_id().unwrap(), fx.alice_account_id);
        assert!(!fx.bank.allows_overdraft());
        assert!(fx.bank_allows_negative.allows_overdraft());
        assert_eq!(
            fx.bank_allows_negative
                .balance(&fx.alice_account_allows_negative_id)
                .unwrap(),
            Money::from_major(200)
        );
    }
}
