use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use tokio::sync::watch;

use super::{Persistence, Snapshot, push_key, reject_nulls};
use crate::{Payload, Record, ResultEngine, TransactionId};

/// In-process JSON tree keyed by push keys.
///
/// Payloads are kept exactly as written, so [`MemoryStore::raw`] shows what a
/// remote tree store would hold.
#[derive(Debug)]
pub struct MemoryStore {
    tree: Mutex<BTreeMap<TransactionId, Payload>>,
    sender: watch::Sender<Snapshot>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Snapshot::default());
        Self {
            tree: Mutex::new(BTreeMap::new()),
            sender,
        }
    }

    /// The payload stored at `id`, as written.
    pub fn raw(&self, id: &TransactionId) -> Option<Payload> {
        self.lock().get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<TransactionId, Payload>> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, tree: &BTreeMap<TransactionId, Payload>) {
        let records: Vec<Record> = tree
            .iter()
            .filter_map(|(id, payload)| match Record::decode(id.clone(), payload) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(%id, "skipping undecodable record: {err}");
                    None
                }
            })
            .collect();
        self.sender.send_replace(Arc::new(records));
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.sender.subscribe()
    }

    async fn push(&self, payload: Payload) -> ResultEngine<TransactionId> {
        reject_nulls(&payload)?;
        let id = push_key();
        let mut tree = self.lock();
        tree.insert(id.clone(), payload);
        self.publish(&tree);
        Ok(id)
    }

    async fn set(&self, id: &TransactionId, payload: Payload) -> ResultEngine<()> {
        reject_nulls(&payload)?;
        let mut tree = self.lock();
        tree.insert(id.clone(), payload);
        self.publish(&tree);
        Ok(())
    }

    async fn remove(&self, id: &TransactionId) -> ResultEngine<()> {
        let mut tree = self.lock();
        if tree.remove(id).is_some() {
            self.publish(&tree);
        }
        Ok(())
    }
}
