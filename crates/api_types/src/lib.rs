use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionType {
        /// Income.
        Debit,
        /// Expense.
        Credit,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TypeFilter {
        #[default]
        All,
        Debit,
        Credit,
    }

    /// Query string of `GET /transactions`.
    ///
    /// `month` (0-based) and `year` select a calendar month and must be given
    /// together.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub filter: Option<TypeFilter>,
        pub month: Option<u32>,
        pub year: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: String,
        /// RFC3339 timestamp in the display time zone.
        pub date: DateTime<FixedOffset>,
        /// e.g. `10 Mar 2024`.
        pub date_label: String,
        /// e.g. `08.00`.
        pub time_label: String,
        pub description: String,
        pub category: String,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub amount: i64,
        pub amount_label: String,
        /// Running balance right after this transaction.
        pub balance: i64,
        pub balance_label: String,
        #[serde(
            rename = "buktiUrl",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        pub bukti_url: Option<String>,
    }

    /// Newest first.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub total_balance: i64,
        pub total_balance_label: String,
    }

    /// Body of create and update requests, and the `transaction` part of a
    /// form submission.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TransactionSave {
        /// RFC3339 timestamp, including timezone offset.
        pub date: DateTime<FixedOffset>,
        pub description: String,
        pub category: String,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub amount: i64,
        #[serde(
            rename = "buktiUrl",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        pub bukti_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: String,
    }
}

pub mod summary {
    use super::*;

    /// Dashboard cards: total balance plus this month's income and expense.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Summary {
        pub total_balance: i64,
        pub total_balance_label: String,
        /// e.g. `Maret 2024`.
        pub month_label: String,
        pub income: i64,
        pub income_label: String,
        pub expense: i64,
        pub expense_label: String,
    }
}

pub mod chart {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ChartQuery {
        /// Defaults to the current year.
        pub year: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyChart {
        pub year: i32,
        /// Always twelve entries, January first.
        pub months: Vec<ChartMonth>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChartMonth {
        pub month: u32,
        /// Short month name, e.g. `Agu`.
        pub label: String,
        pub income: i64,
        pub expense: i64,
    }
}

pub mod category {
    use super::*;
    use crate::transaction::TransactionType;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoriesQuery {
        #[serde(rename = "type")]
        pub kind: TransactionType,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Categories {
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub categories: Vec<String>,
    }
}

pub mod attachment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AttachmentUploaded {
        pub url: String,
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
