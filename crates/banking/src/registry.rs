//! Directories resolving identifiers to live users and banks.
//!
//! There is no process-wide registry: a [`Directory`] is handed to
//! [`crate::Bank::send`] explicitly, and tests build a fresh one per scenario.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use minibank_core::{BankId, DomainError, DomainResult, Entity, UserId};

use crate::bank::Bank;
use crate::user::User;

/// Keyed store of shared values.
///
/// `register` is an upsert; entries only disappear through `clear`.
#[derive(Debug)]
pub struct Registry<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Copy + core::fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value under `key`, returning the shared handle.
    pub fn register(&self, key: K, value: impl Into<Arc<V>>) -> Arc<V> {
        let value = value.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, Arc::clone(&value));
        value
    }

    /// Look up `key`; a miss is `DomainError::NotFound`, never a placeholder.
    pub fn get(&self, key: &K) -> DomainResult<Arc<V>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| DomainError::not_found(key))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry (scenario isolation).
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Capability to resolve transfer parties by id.
pub trait Directory {
    /// Fails with `UserNotFound`.
    fn user(&self, id: &UserId) -> DomainResult<Arc<User>>;

    /// Fails with `BankNotFound`.
    fn bank(&self, id: &BankId) -> DomainResult<Arc<Bank>>;
}

/// In-memory [`Directory`]: one registry for users, one for banks.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: Registry<UserId, User>,
    banks: Registry<BankId, Bank>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_user(&self, user: User) -> Arc<User> {
        let id = user.id_typed();
        self.users.register(id, user)
    }

    /// Register a bank so cross-bank transfers can reach it.
    pub fn register_bank(&self, bank: impl Into<Arc<Bank>>) -> Arc<Bank> {
        let bank = bank.into();
        self.banks.register(*bank.id(), Arc::clone(&bank))
    }

    pub fn users(&self) -> &Registry<UserId, User> {
        &self.users
    }

    pub fn banks(&self) -> &Registry<BankId, Bank> {
        &self.banks
    }

    pub fn clear(&self) {
        self.users.clear();
        self.banks.clear();
    }
}

impl Directory for InMemoryDirectory {
    fn user(&self, id: &UserId) -> DomainResult<Arc<User>> {
        self.users
            .get(id)
            .map_err(|_| DomainError::UserNotFound(*id))
    }

    fn bank(&self, id: &BankId) -> DomainResult<Arc<Bank>> {
        self.banks
            .get(id)
            .map_err(|_| DomainError::BankNotFound(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::BankOptions;

    #[test]
    fn get_missing_key_is_not_found() {
        let registry: Registry<UserId, User> = Registry::new();
        let id = UserId::new();
        assert_eq!(
            registry.get(&id).unwrap_err(),
            DomainError::NotFound(id.to_string())
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn register_is_an_upsert() {
        let registry: Registry<UserId, User> = Registry::new();
        let id = UserId::new();

        registry.register(id, User::with_id(id, "Alice", vec![]));
        registry.register(id, User::with_id(id, "Alicia", vec![]));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&id).unwrap().name(), "Alicia");
    }

    #[test]
    fn clear_wipes_all_entries() {
        let directory = InMemoryDirectory::new();
        let user = directory.register_user(User::new("Bob", vec![]));
        let bank = directory.register_bank(Bank::new(BankOptions::default()));

        directory.clear();

        assert_eq!(
            directory.user(&user.id_typed()).unwrap_err(),
            DomainError::UserNotFound(user.id_typed())
        );
        assert_eq!(
            directory.bank(bank.id()).unwrap_err(),
            DomainError::BankNotFound(*bank.id())
        );
    }

    #[test]
    fn directory_resolves_registered_entries() {
        let directory = InMemoryDirectory::new();
        let user = directory.register_user(User::new("Carol", vec![]));
        let bank = directory.register_bank(Bank::new(BankOptions::default()));

        assert!(Arc::ptr_eq(&directory.user(&user.id_typed()).unwrap(), &user));
        assert!(Arc::ptr_eq(&directory.bank(bank.id()).unwrap(), &bank));
        assert_eq!(directory.users().len(), 1);
        assert_eq!(directory.banks().len(), 1);
    }
}
