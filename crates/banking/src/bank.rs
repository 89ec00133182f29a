use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use minibank_core::{AccountId, BankId, DomainError, DomainResult, Entity, Money};

use crate::account::{Account, AccountSnapshot};

pub(crate) type Accounts = HashMap<AccountId, Account>;

/// Policy fixed at bank creation and inherited by every account it opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankOptions {
    /// Whether withdrawals may take a balance below zero. Off by default.
    #[serde(default)]
    pub allow_overdraft: bool,
}

impl BankOptions {
    pub fn allowing_overdraft() -> Self {
        Self {
            allow_overdraft: true,
        }
    }
}

/// A bank: sole owner of its accounts.
///
/// One mutex guards the whole account map, so every operation on a bank
/// (including a transfer between two of its accounts) is a single critical
/// section.
#[derive(Debug)]
pub struct Bank {
    id: BankId,
    options: BankOptions,
    accounts: Mutex<Accounts>,
}

impl Bank {
    pub fn new(options: BankOptions) -> Self {
        Self::with_id(BankId::new(), options)
    }

    pub fn with_id(id: BankId, options: BankOptions) -> Self {
        Self {
            id,
            options,
            accounts: Mutex::new(HashMap::new()),
        }
    }

    pub fn id_typed(&self) -> BankId {
        self.id
    }

    pub fn options(&self) -> BankOptions {
        self.options
    }

    pub fn allows_overdraft(&self) -> bool {
        self.options.allow_overdraft
    }

    /// Lock the account map.
    ///
    /// Poisoning is recovered: accounts only change through `apply` after a
    /// successful `handle`, so a panicking holder cannot leave a torn balance.
    pub(crate) fn ledger(&self) -> MutexGuard<'_, Accounts> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open an account under this bank's overdraft policy and return a
    /// snapshot of it.
    pub fn create_account(&self, initial_balance: Money) -> AccountSnapshot {
        let account = Account::open(AccountId::new(), initial_balance, self.options.allow_overdraft);
        let snapshot = account.snapshot();
        self.ledger().insert(account.id_typed(), account);

        tracing::debug!(
            bank_id = %self.id,
            account_id = %snapshot.id_typed(),
            initial_balance = %initial_balance,
            "account opened"
        );

        snapshot
    }

    /// Read-only snapshot of an account. A miss never creates an entry.
    pub fn get_account(&self, id: &AccountId) -> DomainResult<AccountSnapshot> {
        self.ledger()
            .get(id)
            .map(Account::snapshot)
            .ok_or(DomainError::AccountNotFound(*id))
    }

    /// Run `f` against the live account while holding the bank lock. This is
    /// the only way to mutate an account in place.
    pub fn with_account_mut<R>(
        &self,
        id: &AccountId,
        f: impl FnOnce(&mut Account) -> DomainResult<R>,
    ) -> DomainResult<R> {
        let mut ledger = self.ledger();
        let account = ledger
            .get_mut(id)
            .ok_or(DomainError::AccountNotFound(*id))?;
        f(account)
    }

    /// Deposit into an account; returns the new balance.
    pub fn deposit(&self, id: &AccountId, amount: Money) -> DomainResult<Money> {
        self.with_account_mut(id, |account| {
            account.deposit(amount)?;
            Ok(account.balance())
        })
    }

    /// Withdraw from an account; returns the new balance.
    pub fn withdraw(&self, id: &AccountId, amount: Money) -> DomainResult<Money> {
        self.with_account_mut(id, |account| {
            account.withdraw(amount)?;
            Ok(account.balance())
        })
    }

    pub fn balance(&self, id: &AccountId) -> DomainResult<Money> {
        self.ledger()
            .get(id)
            .map(Account::balance)
            .ok_or(DomainError::AccountNotFound(*id))
    }

    pub fn account_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self.ledger().keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.ledger().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all balances held by this bank.
    pub fn total_balance(&self) -> DomainResult<Money> {
        self.ledger()
            .values()
            .try_fold(Money::ZERO, |total, account| total.checked_add(account.balance()))
    }
}

impl Entity for Bank {
    type Id = BankId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
