use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database};

use engine::{
    AttachmentStorage, AttachmentUpload, EngineError, Ledger, LedgerStore, LedgerSubscription,
    MAX_AMOUNT, MemoryStore, Persistence, Rupiah, SaveTransaction, SqliteStore, TransactionId,
    TransactionInput, TransactionType, UploadError,
};
use migration::MigratorTrait;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn input(date: DateTime<Utc>, kind: TransactionType, amount: i64) -> TransactionInput {
    let category = match kind {
        TransactionType::Debit => "Setoran",
        TransactionType::Credit => "Operasional",
    };
    TransactionInput {
        date,
        description: format!("{kind} {amount}"),
        category: category.to_string(),
        kind,
        amount: Rupiah::new(amount),
        bukti_url: None,
    }
}

fn balances(ledger: &Ledger) -> Vec<i64> {
    ledger
        .transactions()
        .iter()
        .map(|tx| tx.balance.value())
        .collect()
}

async fn wait_len(subscription: &mut LedgerSubscription, len: usize) -> Ledger {
    tokio::time::timeout(
        Duration::from_secs(2),
        subscription.wait_for(|ledger| ledger.len() == len),
    )
    .await
    .expect("ledger did not reach expected length")
    .expect("subscription stopped")
}

async fn sqlite_store() -> SqliteStore {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    SqliteStore::new(db).await.unwrap()
}

struct FixedUrl;

#[async_trait]
impl AttachmentStorage for FixedUrl {
    async fn upload(&self, file: AttachmentUpload) -> Result<String, UploadError> {
        Ok(format!("https://files.test/{}", file.file_name))
    }
}

struct Failing;

#[async_trait]
impl AttachmentStorage for Failing {
    async fn upload(&self, _file: AttachmentUpload) -> Result<String, UploadError> {
        Err(UploadError::MissingPreset)
    }
}

fn receipt() -> AttachmentUpload {
    AttachmentUpload {
        file_name: "nota.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![1, 2, 3],
    }
}

#[tokio::test]
async fn create_round_trip_derives_balances() {
    let store = LedgerStore::new(Arc::new(MemoryStore::new()));
    let mut subscription = store.start();

    store
        .create(&input(at(10, 1), TransactionType::Debit, 100_000))
        .await
        .unwrap();
    let ledger = wait_len(&mut subscription, 1).await;
    assert_eq!(balances(&ledger), [100_000]);

    store
        .create(&input(at(11, 1), TransactionType::Credit, 40_000))
        .await
        .unwrap();
    let ledger = wait_len(&mut subscription, 2).await;
    assert_eq!(balances(&ledger), [100_000, 60_000]);
    assert_eq!(ledger.total_balance(), Rupiah::new(60_000));
}

#[tokio::test]
async fn delete_recomputes_later_balances() {
    let store = LedgerStore::new(Arc::new(MemoryStore::new()));
    let mut subscription = store.start();

    store
        .create(&input(at(1, 1), TransactionType::Debit, 100))
        .await
        .unwrap();
    let middle = store
        .create(&input(at(2, 1), TransactionType::Credit, 30))
        .await
        .unwrap();
    store
        .create(&input(at(3, 1), TransactionType::Debit, 10))
        .await
        .unwrap();
    assert_eq!(balances(&wait_len(&mut subscription, 3).await), [100, 70, 80]);

    store.delete(&middle).await.unwrap();
    let ledger = wait_len(&mut subscription, 2).await;
    assert_eq!(balances(&ledger), [100, 110]);
    assert!(ledger.get(&middle).is_none());
}

#[tokio::test]
async fn update_replaces_and_reorders() {
    let store = LedgerStore::new(Arc::new(MemoryStore::new()));
    let mut subscription = store.start();

    let first = store
        .create(&input(at(1, 1), TransactionType::Debit, 100))
        .await
        .unwrap();
    store
        .create(&input(at(2, 1), TransactionType::Credit, 30))
        .await
        .unwrap();
    wait_len(&mut subscription, 2).await;

    // Moving the income after the expense makes the first balance negative.
    store
        .update(&first, &input(at(5, 1), TransactionType::Debit, 100))
        .await
        .unwrap();
    let ledger = tokio::time::timeout(
        Duration::from_secs(2),
        subscription.wait_for(|ledger| ledger.transactions().first().map(|tx| tx.balance) == Some(Rupiah::new(-30))),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(balances(&ledger), [-30, 70]);
    assert_eq!(ledger.transactions()[1].id, first);
}

#[tokio::test]
async fn update_writes_at_key_and_delete_is_idempotent() {
    let store = LedgerStore::new(Arc::new(MemoryStore::new()));
    let mut subscription = store.start();
    let ghost = TransactionId::new("ghost");

    store
        .update(&ghost, &input(at(1, 1), TransactionType::Debit, 1))
        .await
        .unwrap();
    let ledger = wait_len(&mut subscription, 1).await;
    assert_eq!(ledger.transactions()[0].id, ghost);

    store.delete(&ghost).await.unwrap();
    wait_len(&mut subscription, 0).await;
    assert_eq!(store.delete(&ghost).await, Ok(()));
}

#[tokio::test]
async fn oversized_amount_is_rejected() {
    let store = LedgerStore::new(Arc::new(MemoryStore::new()));
    let amount = MAX_AMOUNT.value() + 1;
    assert!(matches!(
        store
            .create(&input(at(1, 1), TransactionType::Debit, amount))
            .await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn overflowing_records_keep_subscription_alive() {
    let memory = Arc::new(MemoryStore::new());
    let store = LedgerStore::new(memory.clone());
    let mut subscription = store.start();

    let huge = 5_000_000_000_000_000_000;
    for day in [1, 2] {
        let payload = input(at(day, 1), TransactionType::Debit, huge)
            .to_payload()
            .unwrap();
        memory.push(payload).await.unwrap();
    }
    let ledger = wait_len(&mut subscription, 2).await;
    assert_eq!(ledger.total_balance(), Rupiah::MAX);

    store
        .create(&input(at(3, 1), TransactionType::Credit, 1))
        .await
        .unwrap();
    let ledger = wait_len(&mut subscription, 3).await;
    assert_eq!(ledger.total_balance(), Rupiah::new(i64::MAX - 1));
}

#[tokio::test]
async fn missing_attachment_is_omitted_from_payload() {
    let memory = Arc::new(MemoryStore::new());
    let store = LedgerStore::new(memory.clone());

    let id = store
        .create(&input(at(1, 1), TransactionType::Debit, 1_000))
        .await
        .unwrap();
    let raw = memory.raw(&id).unwrap();
    assert!(!raw.contains_key("buktiUrl"));
    assert!(!raw.contains_key("balance"));
    assert!(!raw.contains_key("id"));
}

#[tokio::test]
async fn null_fields_are_rejected_by_both_stores() {
    let mut payload = input(at(1, 1), TransactionType::Debit, 1)
        .to_payload()
        .unwrap();
    payload.insert("buktiUrl".to_string(), serde_json::Value::Null);

    let memory = MemoryStore::new();
    assert_eq!(
        memory.push(payload.clone()).await,
        Err(EngineError::NullField("buktiUrl".to_string()))
    );

    let sqlite = sqlite_store().await;
    assert_eq!(
        sqlite.push(payload).await,
        Err(EngineError::NullField("buktiUrl".to_string()))
    );
    assert!(sqlite.subscribe().borrow().is_empty());
}

#[tokio::test]
async fn save_uploads_before_writing() {
    let memory = Arc::new(MemoryStore::new());
    let store = LedgerStore::new(memory.clone());

    let id = store
        .save(
            SaveTransaction {
                id: None,
                input: input(at(1, 1), TransactionType::Credit, 50_000),
                upload: Some(receipt()),
            },
            &FixedUrl,
        )
        .await
        .unwrap();

    let raw = memory.raw(&id).unwrap();
    assert_eq!(raw["buktiUrl"], "https://files.test/nota.png");
}

#[tokio::test]
async fn save_with_id_keeps_existing_attachment() {
    let memory = Arc::new(MemoryStore::new());
    let store = LedgerStore::new(memory.clone());

    let mut original = input(at(1, 1), TransactionType::Credit, 50_000);
    original.bukti_url = Some("https://files.test/old.png".to_string());
    let id = store.create(&original).await.unwrap();

    let mut edited = original.clone();
    edited.description = "Sewa ruko".to_string();
    let saved = store
        .save(
            SaveTransaction {
                id: Some(id.clone()),
                input: edited,
                upload: None,
            },
            &Failing,
        )
        .await
        .unwrap();

    assert_eq!(saved, id);
    let raw = memory.raw(&id).unwrap();
    assert_eq!(raw["description"], "Sewa ruko");
    assert_eq!(raw["buktiUrl"], "https://files.test/old.png");
}

#[tokio::test]
async fn failed_upload_writes_nothing() {
    let memory = Arc::new(MemoryStore::new());
    let store = LedgerStore::new(memory.clone());

    let result = store
        .save(
            SaveTransaction {
                id: None,
                input: input(at(1, 1), TransactionType::Credit, 50_000),
                upload: Some(receipt()),
            },
            &Failing,
        )
        .await;

    assert!(matches!(
        result,
        Err(EngineError::Upload(UploadError::MissingPreset))
    ));
    assert!(memory.subscribe().borrow().is_empty());
}

#[tokio::test]
async fn invalid_save_skips_upload() {
    let memory = Arc::new(MemoryStore::new());
    let store = LedgerStore::new(memory.clone());

    let mut blank = input(at(1, 1), TransactionType::Credit, 50_000);
    blank.description.clear();
    let result = store
        .save(
            SaveTransaction {
                id: None,
                input: blank,
                upload: Some(receipt()),
            },
            &Failing,
        )
        .await;

    assert!(matches!(result, Err(EngineError::Validation(_))));
}

#[tokio::test]
async fn equal_timestamps_follow_creation_order() {
    let store = LedgerStore::new(Arc::new(MemoryStore::new()));
    let mut subscription = store.start();

    let first = store
        .create(&input(at(4, 9), TransactionType::Debit, 100))
        .await
        .unwrap();
    let second = store
        .create(&input(at(4, 9), TransactionType::Credit, 30))
        .await
        .unwrap();

    let ledger = wait_len(&mut subscription, 2).await;
    let ids: Vec<&TransactionId> = ledger.transactions().iter().map(|tx| &tx.id).collect();
    assert_eq!(ids, [&first, &second]);
    assert_eq!(balances(&ledger), [100, 70]);
}

#[tokio::test]
async fn sqlite_store_round_trip() {
    let store = LedgerStore::new(Arc::new(sqlite_store().await));
    let mut subscription = store.start();

    let later = store
        .create(&input(at(12, 1), TransactionType::Credit, 10_000))
        .await
        .unwrap();
    let mut with_receipt = input(at(10, 1), TransactionType::Debit, 100_000);
    with_receipt.bukti_url = Some("https://files.test/a.png".to_string());
    store.create(&with_receipt).await.unwrap();

    let ledger = wait_len(&mut subscription, 2).await;
    assert_eq!(balances(&ledger), [100_000, 90_000]);
    assert_eq!(
        ledger.transactions()[0].bukti_url.as_deref(),
        Some("https://files.test/a.png")
    );

    store.delete(&later).await.unwrap();
    let ledger = wait_len(&mut subscription, 1).await;
    assert_eq!(ledger.total_balance(), Rupiah::new(100_000));

    assert_eq!(store.delete(&later).await, Ok(()));

    let restored = input(at(12, 1), TransactionType::Credit, 5_000);
    store.update(&later, &restored).await.unwrap();
    let ledger = wait_len(&mut subscription, 2).await;
    assert_eq!(balances(&ledger), [100_000, 95_000]);

    store
        .update(&later, &input(at(12, 1), TransactionType::Credit, 20_000))
        .await
        .unwrap();
    let ledger = subscription
        .wait_for(|ledger| ledger.total_balance() == Rupiah::new(80_000))
        .await
        .unwrap();
    assert_eq!(ledger.len(), 2);
}

#[tokio::test]
async fn sqlite_store_loads_existing_rows() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let first = SqliteStore::new(db.clone()).await.unwrap();
    first
        .push(
            input(at(3, 1), TransactionType::Debit, 7_000)
                .to_payload()
                .unwrap(),
        )
        .await
        .unwrap();

    let reopened = SqliteStore::new(db).await.unwrap();
    let subscription = LedgerStore::new(Arc::new(reopened)).start();
    assert_eq!(subscription.current().total_balance(), Rupiah::new(7_000));
}

#[tokio::test]
async fn sqlite_write_succeeds_when_reload_fails() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let store = SqliteStore::new(db.clone()).await.unwrap();

    db.execute_unprepared(
        "INSERT INTO transactions (id, date, description, category, kind, amount) \
         VALUES ('broken', 'not-a-date', 'x', 'Setoran', 'debit', 1)",
    )
    .await
    .unwrap();

    let payload = input(at(1, 1), TransactionType::Debit, 500)
        .to_payload()
        .unwrap();
    assert!(store.push(payload).await.is_ok());
    assert!(store.subscribe().borrow().is_empty());

    db.execute_unprepared("DELETE FROM transactions WHERE id = 'broken'")
        .await
        .unwrap();
    let payload = input(at(2, 1), TransactionType::Debit, 700)
        .to_payload()
        .unwrap();
    store.push(payload).await.unwrap();
    assert_eq!(store.subscribe().borrow().len(), 2);
}
