//! Derived views over a balance-annotated ledger.
//!
//! Everything here is pure and never touches persistence. Calendar fields
//! (month, year) are read in the display time zone passed by the caller, and
//! months are 0-based.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, Rupiah, Transaction, TransactionType};

/// Which transaction types a list view shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    #[default]
    All,
    Debit,
    Credit,
}

impl TypeFilter {
    fn matches(self, kind: TransactionType) -> bool {
        match self {
            Self::All => true,
            Self::Debit => kind == TransactionType::Debit,
            Self::Credit => kind == TransactionType::Credit,
        }
    }
}

/// A calendar month of a given year.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthFilter {
    month0: u32,
    year: i32,
}

impl MonthFilter {
    pub fn new(month0: u32, year: i32) -> ResultEngine<Self> {
        if month0 > 11 {
            return Err(EngineError::InvalidMonth(month0));
        }
        Ok(Self { month0, year })
    }

    pub fn month0(self) -> u32 {
        self.month0
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn contains(self, instant: DateTime<Utc>, tz: Tz) -> bool {
        let local = instant.with_timezone(&tz);
        local.month0() == self.month0 && local.year() == self.year
    }
}

/// Selection for the primary list/table view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewSpec {
    pub type_filter: TypeFilter,
    pub month: Option<MonthFilter>,
}

/// Income and expense sums for one calendar month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub month0: u32,
    pub income: Rupiah,
    pub expense: Rupiah,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub income: Rupiah,
    pub expense: Rupiah,
}

impl MonthTotals {
    fn add(&mut self, tx: &Transaction) {
        match tx.kind {
            TransactionType::Debit => self.income = self.income.saturating_add(tx.amount),
            TransactionType::Credit => self.expense = self.expense.saturating_add(tx.amount),
        }
    }
}

/// Keeps the transactions matching `filter`, preserving order.
pub fn filter_by_type(seq: &[Transaction], filter: TypeFilter) -> Vec<Transaction> {
    seq.iter()
        .filter(|tx| filter.matches(tx.kind))
        .cloned()
        .collect()
}

/// Keeps the transactions dated in the given month; `None` keeps everything.
pub fn filter_by_month(seq: &[Transaction], month: Option<MonthFilter>, tz: Tz) -> Vec<Transaction> {
    match month {
        None => seq.to_vec(),
        Some(month) => seq
            .iter()
            .filter(|tx| month.contains(tx.date, tz))
            .cloned()
            .collect(),
    }
}

/// Newest first. Balances are carried over untouched.
pub fn reverse_for_display(seq: &[Transaction]) -> Vec<Transaction> {
    seq.iter().rev().cloned().collect()
}

/// The list/table view: reverse, then month filter, then type filter.
pub fn primary_view(seq: &[Transaction], selection: &ViewSpec, tz: Tz) -> Vec<Transaction> {
    let newest_first = reverse_for_display(seq);
    let in_month = filter_by_month(&newest_first, selection.month, tz);
    filter_by_type(&in_month, selection.type_filter)
}

/// Sums income and expense for each month of `year`. Always 12 buckets.
pub fn aggregate_monthly(seq: &[Transaction], year: i32, tz: Tz) -> [MonthlyBucket; 12] {
    let mut buckets: [MonthlyBucket; 12] = std::array::from_fn(|i| MonthlyBucket {
        month0: i as u32,
        ..MonthlyBucket::default()
    });

    for tx in seq {
        let local = tx.date.with_timezone(&tz);
        if local.year() != year {
            continue;
        }
        let bucket = &mut buckets[local.month0() as usize];
        match tx.kind {
            TransactionType::Debit => bucket.income = bucket.income.saturating_add(tx.amount),
            TransactionType::Credit => bucket.expense = bucket.expense.saturating_add(tx.amount),
        }
    }

    buckets
}

/// Income and expense of the calendar month containing `now`.
pub fn current_month_totals(seq: &[Transaction], now: DateTime<Utc>, tz: Tz) -> MonthTotals {
    let local = now.with_timezone(&tz);
    let month = MonthFilter {
        month0: local.month0(),
        year: local.year(),
    };

    let mut totals = MonthTotals::default();
    for tx in seq.iter().filter(|tx| month.contains(tx.date, tz)) {
        totals.add(tx);
    }
    totals
}
