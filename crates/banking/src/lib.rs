//! Banking module: accounts, banks, users and transfers.
//!
//! In-memory only: no IO, no persistence. Parties of a transfer are resolved
//! through an explicitly passed [`Directory`].

pub mod account;
pub mod bank;
pub mod fixtures;
pub mod registry;
pub mod transfer;
pub mod user;

pub use account::{Account, AccountCommand, AccountEvent, AccountSnapshot};
pub use bank::{Bank, BankOptions};
pub use fixtures::Fixtures;
pub use registry::{Directory, InMemoryDirectory, Registry};
pub use transfer::TransferReceipt;
pub use user::User;
