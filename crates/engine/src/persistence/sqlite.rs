use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, sea_query::OnConflict,
};
use tokio::sync::{Mutex, watch};

use super::{Persistence, Snapshot, push_key, reject_nulls};
use crate::{
    Payload, Record, ResultEngine, TransactionId,
    transactions::{ActiveModel, Column, Entity},
};

/// Relational store backed by the `transactions` table.
///
/// After every successful write the table is reloaded and published as a new
/// snapshot. Writes are serialized so snapshots are published in write order.
/// A failed reload is logged and the write still succeeds; the next write
/// publishes the table again.
#[derive(Debug)]
pub struct SqliteStore {
    database: DatabaseConnection,
    sender: watch::Sender<Snapshot>,
    write_lock: Mutex<()>,
}

impl SqliteStore {
    /// Loads the current table and prepares the store. The schema must
    /// already be migrated.
    pub async fn new(database: DatabaseConnection) -> ResultEngine<Self> {
        let initial = load(&database).await?;
        let (sender, _) = watch::channel(Arc::new(initial));
        Ok(Self {
            database,
            sender,
            write_lock: Mutex::new(()),
        })
    }

    async fn publish(&self) {
        match load(&self.database).await {
            Ok(records) => {
                tracing::debug!(records = records.len(), "publishing snapshot");
                self.sender.send_replace(Arc::new(records));
            }
            Err(err) => tracing::error!("failed to reload transactions after write: {err}"),
        }
    }
}

async fn load(database: &DatabaseConnection) -> ResultEngine<Vec<Record>> {
    let models = Entity::find()
        .order_by_asc(Column::Date)
        .order_by_asc(Column::Id)
        .all(database)
        .await?;

    Ok(models
        .into_iter()
        .filter_map(|model| {
            let id = model.id.clone();
            match Record::try_from(model) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(%id, "skipping undecodable row: {err}");
                    None
                }
            }
        })
        .collect())
}

fn decode(id: &TransactionId, payload: &Payload) -> ResultEngine<Record> {
    reject_nulls(payload)?;
    Record::decode(id.clone(), payload)
}

#[async_trait]
impl Persistence for SqliteStore {
    fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.sender.subscribe()
    }

    async fn push(&self, payload: Payload) -> ResultEngine<TransactionId> {
        let id = push_key();
        let record = decode(&id, &payload)?;

        let _guard = self.write_lock.lock().await;
        ActiveModel::from((&record.id, &record.data))
            .insert(&self.database)
            .await?;
        self.publish().await;
        Ok(id)
    }

    async fn set(&self, id: &TransactionId, payload: Payload) -> ResultEngine<()> {
        let record = decode(id, &payload)?;

        let _guard = self.write_lock.lock().await;
        Entity::insert(ActiveModel::from((&record.id, &record.data)))
            .on_conflict(
                OnConflict::column(Column::Id)
                    .update_columns([
                        Column::Date,
                        Column::Description,
                        Column::Category,
                        Column::Kind,
                        Column::Amount,
                        Column::BuktiUrl,
                    ])
                    .to_owned(),
            )
            .exec(&self.database)
            .await?;
        self.publish().await;
        Ok(())
    }

    async fn remove(&self, id: &TransactionId) -> ResultEngine<()> {
        let _guard = self.write_lock.lock().await;
        let result = Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected > 0 {
            self.publish().await;
        }
        Ok(())
    }
}
