use std::sync::Arc;

use crate::{Record, Rupiah, Transaction, TransactionId};

/// Derives running balances from an unordered set of records.
///
/// - Sorts ascending by `date`; equal dates are ordered by ascending id.
/// - Replays the sorted records once, accumulating the signed amounts.
/// - The balance of each transaction is the total right after it.
/// - A running total that would overflow is clamped to the `i64` range.
pub fn derive_balances(records: impl IntoIterator<Item = Record>) -> Vec<Transaction> {
    let mut sorted: Vec<Record> = records.into_iter().collect();
    sorted.sort_by(|a, b| a.data.date.cmp(&b.data.date).then_with(|| a.id.cmp(&b.id)));

    let mut balance = Rupiah::ZERO;
    sorted
        .into_iter()
        .map(|record| {
            let signed = record.data.kind.signed(record.data.amount);
            balance = balance.checked_add(signed).unwrap_or_else(|| {
                tracing::warn!(id = %record.id, "running balance overflowed, clamping");
                balance.saturating_add(signed)
            });
            Transaction::from_record(record, balance)
        })
        .collect()
}

/// An immutable, balance-annotated view of the whole ledger in ascending
/// chronological order.
///
/// Cloning is cheap; every snapshot produces a fresh `Ledger`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    transactions: Arc<[Transaction]>,
}

impl Ledger {
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            transactions: derive_balances(records).into(),
        }
    }

    /// Transactions, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The balance of the chronologically last transaction, or zero.
    pub fn total_balance(&self) -> Rupiah {
        self.transactions
            .last()
            .map_or(Rupiah::ZERO, |tx| tx.balance)
    }

    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| &tx.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
