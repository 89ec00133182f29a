use minibank_core::{AccountId, DomainError, Entity, UserId};

/// An account holder.
///
/// Holds account ids only (weak references); they are resolved against a bank
/// at transfer time and never validated on construction. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    account_ids: Vec<AccountId>,
}

impl User {
    /// Build a user with a fresh id. Nothing is registered anywhere; see
    /// [`crate::InMemoryDirectory::register_user`].
    pub fn new(name: impl Into<String>, account_ids: Vec<AccountId>) -> Self {
        Self::with_id(UserId::new(), name, account_ids)
    }

    pub fn with_id(id: UserId, name: impl Into<String>, account_ids: Vec<AccountId>) -> Self {
        Self {
            id,
            name: name.into(),
            account_ids,
        }
    }

    pub fn id_typed(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owned account ids, primary first.
    pub fn account_ids(&self) -> &[AccountId] {
        &self.account_ids
    }

    /// The account implicitly used as source/destination of a transfer.
    pub fn primary_account_id(&self) -> Result<AccountId, DomainError> {
        self.account_ids
            .first()
            .copied()
            .ok_or(DomainError::NoAccounts(self.id))
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
