//! Cash ledger core.
//!
//! Records come in from a [`Persistence`] collaborator, get sorted and
//! annotated with running balances ([`Ledger`]), and are sliced into views by
//! the functions in [`views`]. [`format`] renders amounts and dates for the
//! Indonesian locale.

pub use attachments::{AttachmentStorage, AttachmentUpload, LocalAttachmentStorage, UploadError};
pub use balances::{Ledger, derive_balances};
pub use categories::{EXPENSE_CATEGORIES, INCOME_CATEGORIES};
pub use error::EngineError;
pub use money::Rupiah;
pub use persistence::{MemoryStore, Persistence, Snapshot, SqliteStore};
pub use store::{LedgerStore, LedgerSubscription, SaveTransaction};
pub use transactions::{
    MAX_AMOUNT, Payload, Record, Transaction, TransactionId, TransactionInput, TransactionType,
};
pub use views::{MonthFilter, MonthTotals, MonthlyBucket, TypeFilter, ViewSpec};

mod attachments;
mod balances;
mod categories;
mod error;
pub mod format;
mod money;
mod persistence;
mod store;
mod transactions;
pub mod views;

pub type ResultEngine<T> = Result<T, EngineError>;
