//! Persistence collaborators.
//!
//! A store keeps transaction payloads under opaque keys and republishes the
//! whole collection after every write. Subscribers never see partial updates.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::{EngineError, Payload, Record, ResultEngine, TransactionId};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Every persisted record, in no particular order.
pub type Snapshot = Arc<Vec<Record>>;

#[async_trait]
pub trait Persistence: Send + Sync {
    /// Returns a receiver holding the latest snapshot.
    fn subscribe(&self) -> watch::Receiver<Snapshot>;

    /// Writes `payload` under a freshly generated key and returns it.
    async fn push(&self, payload: Payload) -> ResultEngine<TransactionId>;

    /// Replaces the payload stored at `id`.
    async fn set(&self, id: &TransactionId, payload: Payload) -> ResultEngine<()>;

    async fn remove(&self, id: &TransactionId) -> ResultEngine<()>;
}

/// Fails on the first field holding `null`. Absent values must be omitted.
pub(crate) fn reject_nulls(payload: &Payload) -> ResultEngine<()> {
    match payload.iter().find(|(_, value)| value.is_null()) {
        Some((key, _)) => Err(EngineError::NullField(key.clone())),
        None => Ok(()),
    }
}

/// Generates a time-ordered key, so that keys sort in creation order.
pub(crate) fn push_key() -> TransactionId {
    TransactionId::new(uuid::Uuid::now_v7().to_string())
}
