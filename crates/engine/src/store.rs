//! The ledger store.
//!
//! Writes go straight to the persistence collaborator and never touch local
//! derived state: the derived [`Ledger`] only changes when the next snapshot
//! arrives through a [`LedgerSubscription`].

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    AttachmentStorage, AttachmentUpload, Ledger, ResultEngine, TransactionId, TransactionInput,
    persistence::Persistence,
};

/// A form submission: create when `id` is `None`, replace otherwise.
#[derive(Clone, Debug)]
pub struct SaveTransaction {
    pub id: Option<TransactionId>,
    pub input: TransactionInput,
    /// File to upload before writing; its URL becomes the attachment.
    pub upload: Option<AttachmentUpload>,
}

#[derive(Clone)]
pub struct LedgerStore {
    persistence: Arc<dyn Persistence>,
}

impl LedgerStore {
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self { persistence }
    }

    /// Subscribes to the persistence snapshots and derives a new ledger from
    /// each one on a background task.
    ///
    /// Must be called inside a tokio runtime. The task lives as long as the
    /// returned handle.
    pub fn start(&self) -> LedgerSubscription {
        let mut snapshots = self.persistence.subscribe();
        let initial = Ledger::from_records(snapshots.borrow_and_update().iter().cloned());
        let (sender, receiver) = watch::channel(initial);

        let task = tokio::spawn(async move {
            while snapshots.changed().await.is_ok() {
                let records = snapshots.borrow_and_update().clone();
                let ledger = Ledger::from_records(records.iter().cloned());
                tracing::debug!(transactions = ledger.len(), "ledger re-derived");
                if sender.send(ledger).is_err() {
                    break;
                }
            }
            tracing::debug!("ledger subscription finished");
        });

        LedgerSubscription { receiver, task }
    }

    pub async fn create(&self, input: &TransactionInput) -> ResultEngine<TransactionId> {
        input.validate()?;
        let id = self.persistence.push(input.to_payload()?).await?;
        tracing::debug!(%id, "transaction created");
        Ok(id)
    }

    /// Writes the full value at `id`, whether or not a record is stored there.
    pub async fn update(&self, id: &TransactionId, input: &TransactionInput) -> ResultEngine<()> {
        input.validate()?;
        self.persistence.set(id, input.to_payload()?).await?;
        tracing::debug!(%id, "transaction updated");
        Ok(())
    }

    /// Removes `id`; an absent id is a no-op. Its attachment, if any, is left
    /// in storage.
    pub async fn delete(&self, id: &TransactionId) -> ResultEngine<()> {
        self.persistence.remove(id).await?;
        tracing::debug!(%id, "transaction deleted");
        Ok(())
    }

    /// Validates, uploads the attached file if any, then creates or updates.
    ///
    /// When the upload fails nothing is written.
    pub async fn save(
        &self,
        save: SaveTransaction,
        storage: &dyn AttachmentStorage,
    ) -> ResultEngine<TransactionId> {
        let SaveTransaction {
            id,
            mut input,
            upload,
        } = save;
        input.validate()?;

        if let Some(file) = upload {
            let url = storage.upload(file).await?;
            input.bukti_url = Some(url);
        }

        match id {
            Some(id) => {
                self.update(&id, &input).await?;
                Ok(id)
            }
            None => self.create(&input).await,
        }
    }
}

/// Owned handle to a running derivation task. Dropping it stops the task.
#[derive(Debug)]
pub struct LedgerSubscription {
    receiver: watch::Receiver<Ledger>,
    task: JoinHandle<()>,
}

impl LedgerSubscription {
    /// The most recently derived ledger.
    pub fn current(&self) -> Ledger {
        self.receiver.borrow().clone()
    }

    /// Waits for the next derived ledger. `None` once the task has stopped.
    pub async fn changed(&mut self) -> Option<Ledger> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Waits until the derived ledger satisfies `predicate`.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&Ledger) -> bool) -> Option<Ledger> {
        self.receiver
            .wait_for(predicate)
            .await
            .ok()
            .map(|ledger| ledger.clone())
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for LedgerSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
