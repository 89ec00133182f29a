use serde::{Deserialize, Serialize};

use minibank_core::{AccountId, Aggregate, AggregateRoot, DomainError, Money};

/// Aggregate root: a single bank account.
///
/// State changes only through [`Aggregate::apply`]; validation lives in
/// [`Aggregate::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    balance: Money,
    allow_overdraft: bool,
    version: u64,
}

impl Account {
    /// Open an account. The initial balance is taken as-is (zero and negative
    /// openings are allowed).
    pub fn open(id: AccountId, initial_balance: Money, allow_overdraft: bool) -> Self {
        Self {
            id,
            balance: initial_balance,
            allow_overdraft,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> AccountId {
        self.id
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn allows_overdraft(&self) -> bool {
        self.allow_overdraft
    }

    pub fn deposit(&mut self, amount: Money) -> Result<(), DomainError> {
        self.execute(&AccountCommand::Deposit { amount })?;
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Money) -> Result<(), DomainError> {
        self.execute(&AccountCommand::Withdraw { amount })?;
        Ok(())
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id,
            balance: self.balance,
            allow_overdraft: self.allow_overdraft,
            version: self.version,
        }
    }
}

/// Read-only view of an account held by a bank, taken at one point in time.
///
/// Has no mutators; changes go through [`crate::Bank::deposit`],
/// [`crate::Bank::withdraw`] or [`crate::Bank::with_account_mut`].
///
/// ```compile_fail
/// use minibank_banking::{Bank, BankOptions};
/// use minibank_core::Money;
///
/// let bank = Bank::new(BankOptions::default());
/// let mut account = bank.create_account(Money::from_major(100));
/// account.deposit(Money::from_major(50)).unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    id: AccountId,
    balance: Money,
    allow_overdraft: bool,
    version: u64,
}

impl AccountSnapshot {
    pub fn id_typed(&self) -> AccountId {
        self.id
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn allows_overdraft(&self) -> bool {
        self.allow_overdraft
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

impl AggregateRoot for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountCommand {
    Deposit { amount: Money },
    Withdraw { amount: Money },
}

/// Event carrying the balance it produces, so `apply` never recomputes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountEvent {
    Credited {
        account_id: AccountId,
        amount: Money,
        balance_after: Money,
    },
    Debited {
        account_id: AccountId,
        amount: Money,
        balance_after: Money,
    },
}

impl Aggregate for Account {
    type Command = AccountCommand;
    type Event = AccountEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::Credited { balance_after, .. }
            | AccountEvent::Debited { balance_after, .. } => {
                self.balance = *balance_after;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AccountCommand::Deposit { amount } => self.handle_deposit(*amount),
            AccountCommand::Withdraw { amount } => self.handle_withdraw(*amount),
        }
    }
}

impl Account {
    fn handle_deposit(&self, amount: Money) -> Result<Vec<AccountEvent>, DomainError> {
        let amount = amount.ensure_non_negative()?;
        let balance_after = self.balance.checked_add(amount)?;

        Ok(vec![AccountEvent::Credited {
            account_id: self.id,
            amount,
            balance_after,
        }])
    }

    fn handle_withdraw(&self, amount: Money) -> Result<Vec<AccountEvent>, DomainError> {
        let amount = amount.ensure_non_negative()?;

        if !self.allow_overdraft && self.balance < amount {
            return Err(DomainError::InsufficientFunds {
                account: self.id,
                balance: self.balance,
                requested: amount,
            });
        }

        let balance_after = self.balance.checked_sub(amount)?;

        Ok(vec![AccountEvent::Debited {
            account_id: self.id,
            amount,
            balance_after,
        }])
    }
}
