//! Transfers between the primary accounts of two users.
//!
//! A transfer is one transaction: both legs are validated with
//! [`Aggregate::handle`] while the relevant bank locks are held, and only then
//! are the resulting events applied. No failure can debit the sender without
//! crediting the receiver.

use std::sync::{Arc, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use minibank_core::{AccountId, Aggregate, BankId, DomainError, DomainResult, Money, UserId};

use crate::account::{AccountCommand, AccountEvent};
use crate::bank::{Accounts, Bank};
use crate::registry::Directory;

/// Outcome of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub from_bank: BankId,
    pub from_account: AccountId,
    pub to_bank: BankId,
    pub to_account: AccountId,
    pub amount: Money,
    pub executed_at: DateTime<Utc>,
}

impl Bank {
    /// Move `amount` from `from_user`'s primary account (held by this bank) to
    /// `to_user`'s primary account, held by this bank or by the bank
    /// registered under `to_bank`.
    ///
    /// Errors: `UserNotFound`, `NoAccounts`, `BankNotFound`, `AccountNotFound`,
    /// `InsufficientFunds`, and the amount/overflow errors of
    /// [`crate::Account`]. On any error no balance changes.
    pub fn send<D>(
        &self,
        directory: &D,
        from_user: &UserId,
        to_user: &UserId,
        amount: Money,
        to_bank: Option<&BankId>,
    ) -> DomainResult<TransferReceipt>
    where
        D: Directory + ?Sized,
    {
        let result = self.try_send(directory, from_user, to_user, amount, to_bank);

        match &result {
            Ok(receipt) => tracing::info!(
                from_bank = %receipt.from_bank,
                from_account = %receipt.from_account,
                to_bank = %receipt.to_bank,
                to_account = %receipt.to_account,
                amount = %receipt.amount,
                "transfer committed"
            ),
            Err(err) => tracing::warn!(
                bank_id = %self.id_typed(),
                from_user = %from_user,
                to_user = %to_user,
                amount = %amount,
                error = %err,
                "transfer rejected"
            ),
        }

        result
    }

    fn try_send<D>(
        &self,
        directory: &D,
        from_user: &UserId,
        to_user: &UserId,
        amount: Money,
        to_bank: Option<&BankId>,
    ) -> DomainResult<TransferReceipt>
    where
        D: Directory + ?Sized,
    {
        let sender = directory.user(from_user)?;
        let receiver = directory.user(to_user)?;
        let from_account = sender.primary_account_id()?;
        let to_account = receiver.primary_account_id()?;

        let target: Option<Arc<Bank>> = match to_bank {
            Some(id) if *id != self.id_typed() => {
                let bank = directory.bank(id)?;
                (!std::ptr::eq(self, Arc::as_ptr(&bank))).then_some(bank)
            }
            _ => None,
        };

        let to_bank_id = match &target {
            None => {
                let mut ledger = self.ledger();
                settle_within(&mut ledger, from_account, to_account, amount)?;
                self.id_typed()
            }
            Some(other) => {
                let (mut source, mut dest) = lock_in_order(self, other);
                settle_between(&mut source, &mut dest, from_account, to_account, amount)?;
                other.id_typed()
            }
        };

        Ok(TransferReceipt {
            from_bank: self.id_typed(),
            from_account,
            to_bank: to_bank_id,
            to_account,
            amount,
            executed_at: Utc::now(),
        })
    }
}

/// Lock two distinct banks in ascending `(BankId, address)` order and return
/// the guards as `(source, dest)`.
fn lock_in_order<'a>(
    source: &'a Bank,
    dest: &'a Bank,
) -> (MutexGuard<'a, Accounts>, MutexGuard<'a, Accounts>) {
    let key = |bank: &Bank| (bank.id_typed(), bank as *const Bank as usize);

    if key(source) <= key(dest) {
        let s = source.ledger();
        let d = dest.ledger();
        (s, d)
    } else {
        let d = dest.ledger();
        let s = source.ledger();
        (s, d)
    }
}

fn ensure_exists(ledger: &Accounts, id: AccountId) -> DomainResult<()> {
    if ledger.contains_key(&id) {
        Ok(())
    } else {
        Err(DomainError::AccountNotFound(id))
    }
}

fn prepare(ledger: &Accounts, id: AccountId, command: AccountCommand) -> DomainResult<Vec<AccountEvent>> {
    ledger
        .get(&id)
        .ok_or(DomainError::AccountNotFound(id))?
        .handle(&command)
}

fn commit(ledger: &mut Accounts, id: AccountId, events: &[AccountEvent]) {
    if let Some(account) = ledger.get_mut(&id) {
        for event in events {
            account.apply(event);
        }
    }
}

fn settle_within(ledger: &mut Accounts, from: AccountId, to: AccountId, amount: Money) -> DomainResult<()> {
    ensure_exists(ledger, from)?;
    ensure_exists(ledger, to)?;

    let debit = prepare(ledger, from, AccountCommand::Withdraw { amount })?;
    if from == to {
        // Withdraw and deposit on the same account cancel out once validated.
        return Ok(());
    }
    let credit = prepare(ledger, to, AccountCommand::Deposit { amount })?;

    commit(ledger, from, &debit);
    commit(ledger, to, &credit);
    Ok(())
}

fn settle_between(
    source: &mut Accounts,
    dest: &mut Accounts,
    from: AccountId,
    to: AccountId,
    amount: Money,
) -> DomainResult<()> {
    ensure_exists(source, from)?;
    ensure_exists(dest, to)?;

    let debit = prepare(source, from, AccountCommand::Withdraw { amount })?;
    let credit = prepare(dest, to, AccountCommand::Deposit { amount })?;

    commit(source, from, &debit);
    commit(dest, to, &credit);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::BankOptions;
    use crate::registry::InMemoryDirectory;
    use crate::user::User;

    struct Pair {
        directory: InMemoryDirectory,
        bank: Arc<Bank>,
        alice: UserId,
        alice_account: AccountId,
        bob: UserId,
        bob_account: AccountId,
    }

    fn pair(options: BankOptions, alice_balance: i64, bob_balance: i64) -> Pair {
        let directory = InMemoryDirectory::new();
        let bank = directory.register_bank(Bank::new(options));
        let alice_account = bank.create_account(Money::from_major(alice_balance)).id_typed();
        let bob_account = bank.create_account(Money::from_major(bob_balance)).id_typed();
        let alice = directory
            .register_user(User::new("Alice", vec![alice_account]))
            .id_typed();
        let bob = directory
            .register_user(User::new("Bob", vec![bob_account]))
            .id_typed();

        Pair {
            directory,
            bank,
            alice,
            alice_account,
            bob,
            bob_account,
        }
    }

    #[test]
    fn same_bank_send_moves_funds() {
        let p = pair(BankOptions::default(), 1000, 500);

        let receipt = p
            .bank
            .send(&p.directory, &p.alice, &p.bob, Money::from_major(300), None)
            .unwrap();

        assert_eq!(p.bank.balance(&p.alice_account).unwrap(), Money::from_major(700));
        assert_eq!(p.bank.balance(&p.bob_account).unwrap(), Money::from_major(800));
        assert_eq!(receipt.from_account, p.alice_account);
        assert_eq!(receipt.to_account, p.bob_account);
        assert_eq!(receipt.from_bank, receipt.to_bank);
    }

    #[test]
    fn naming_the_own_bank_is_a_same_bank_send() {
        let p = pair(BankOptions::default(), 10, 0);
        let own = p.bank.id_typed();

        p.bank
            .send(&p.directory, &p.alice, &p.bob, Money::from_major(10), Some(&own))
            .unwrap();

        assert_eq!(p.bank.balance(&p.bob_account).unwrap(), Money::from_major(10));
    }

    #[test]
    fn insufficient_funds_leaves_both_sides_untouched() {
        let p = pair(BankOptions::default(), 100, 5);

        let err = p
            .bank
            .send(&p.directory, &p.alice, &p.bob, Money::from_major(101), None)
            .unwrap_err();

        assert!(matches!(err, DomainError::InsufficientFunds { .. }));
        assert_eq!(p.bank.balance(&p.alice_account).unwrap(), Money::from_major(100));
        assert_eq!(p.bank.balance(&p.bob_account).unwrap(), Money::from_major(5));
    }

    #[test]
    fn failing_credit_leaves_sender_untouched() {
        let p = pair(BankOptions::default(), 100, 0);
        p.bank
            .with_account_mut(&p.bob_account, |bob| bob.deposit(Money::from_minor(i64::MAX)))
            .unwrap();

        let err = p
            .bank
            .send(&p.directory, &p.alice, &p.bob, Money::from_major(1), None)
            .unwrap_err();

        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(p.bank.balance(&p.alice_account).unwrap(), Money::from_major(100));
    }

    #[test]
    fn unknown_parties_are_reported_by_kind() {
        let p = pair(BankOptions::default(), 100, 0);
        let ghost = UserId::new();

        assert_eq!(
            p.bank
                .send(&p.directory, &ghost, &p.bob, Money::from_major(1), None)
                .unwrap_err(),
            DomainError::UserNotFound(ghost)
        );
        assert_eq!(
            p.bank
                .send(&p.directory, &p.alice, &ghost, Money::from_major(1), None)
                .unwrap_err(),
            DomainError::UserNotFound(ghost)
        );

        let nowhere = BankId::new();
        assert_eq!(
            p.bank
                .send(&p.directory, &p.alice, &p.bob, Money::from_major(1), Some(&nowhere))
                .unwrap_err(),
            DomainError::BankNotFound(nowhere)
        );
    }

    #[test]
    fn user_without_accounts_cannot_take_part() {
        let p = pair(BankOptions::default(), 100, 0);
        let empty = p.directory.register_user(User::new("Empty", vec![])).id_typed();

        assert_eq!(
            p.bank
                .send(&p.directory, &empty, &p.bob, Money::from_major(1), None)
                .unwrap_err(),
            DomainError::NoAccounts(empty)
        );
        assert_eq!(
            p.bank
                .send(&p.directory, &p.alice, &empty, Money::from_major(1), None)
                .unwrap_err(),
            DomainError::NoAccounts(empty)
        );
    }

    #[test]
    fn dangling_primary_account_is_account_not_found() {
        let p = pair(BankOptions::default(), 100, 0);
        let dangling = AccountId::new();
        let stranger = p
            .directory
            .register_user(User::new("Stranger", vec![dangling]))
            .id_typed();

        assert_eq!(
            p.bank
                .send(&p.directory, &p.alice, &stranger, Money::from_major(1), None)
                .unwrap_err(),
            DomainError::AccountNotFound(dangling)
        );
        assert_eq!(p.bank.balance(&p.alice_account).unwrap(), Money::from_major(100));
    }

    #[test]
    fn self_transfer_validates_but_keeps_balance() {
        let p = pair(BankOptions::default(), 100, 0);

        p.bank
            .send(&p.directory, &p.alice, &p.alice, Money::from_major(40), None)
            .unwrap();
        assert_eq!(p.bank.balance(&p.alice_account).unwrap(), Money::from_major(100));

        let err = p
            .bank
            .send(&p.directory, &p.alice, &p.alice, Money::from_major(400), None)
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientFunds { .. }));
    }
}
