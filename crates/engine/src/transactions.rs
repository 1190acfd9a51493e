//! Transaction primitives.
//!
//! A [`TransactionInput`] is what a caller writes; a [`Record`] is what the
//! persistence layer hands back (input plus the id it assigned); a
//! [`Transaction`] is a record annotated with its derived running balance.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, Rupiah};

/// Write payload handed to a persistence collaborator: a JSON object in which
/// absent optional fields are omitted, never `null`.
pub type Payload = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Income, increases the balance.
    Debit,
    /// Expense, decreases the balance.
    Credit,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Applies the type's sign to a non-negative amount.
    #[must_use]
    pub fn signed(self, amount: Rupiah) -> Rupiah {
        match self {
            Self::Debit => amount,
            Self::Credit => amount.checked_neg().unwrap_or(Rupiah::MAX),
        }
    }
}

impl TryFrom<&str> for TransactionType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(EngineError::InvalidRecord(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque identifier assigned by the persistence layer.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The fields a caller controls. `id` and `balance` are never part of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub date: DateTime<Utc>,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Rupiah,
    /// URL of an uploaded proof-of-transaction image.
    #[serde(
        rename = "buktiUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bukti_url: Option<String>,
}

/// Largest amount a single transaction may carry: one quadrillion rupiah.
///
/// Running balances stay far inside `i64` for any realistic ledger size.
pub const MAX_AMOUNT: Rupiah = Rupiah::new(1_000_000_000_000_000);

impl TransactionInput {
    /// Checks the fields a save requires.
    ///
    /// Category membership is not checked here: which categories a type
    /// allows is a form rule (see [`TransactionType::allows_category`]).
    pub fn validate(&self) -> ResultEngine<()> {
        if self.description.trim().is_empty() {
            return Err(EngineError::Validation(
                "description is required".to_string(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(EngineError::Validation("category is required".to_string()));
        }
        if self.amount.value() <= 0 {
            return Err(EngineError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }
        if self.amount > MAX_AMOUNT {
            return Err(EngineError::Validation(format!(
                "amount must not exceed {MAX_AMOUNT}"
            )));
        }
        Ok(())
    }

    /// Builds the write payload. A missing attachment is left out entirely.
    pub fn to_payload(&self) -> ResultEngine<Payload> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Err(EngineError::InvalidRecord(
                "transaction did not serialize to an object".to_string(),
            )),
            Err(err) => Err(EngineError::InvalidRecord(err.to_string())),
        }
    }
}

/// A persisted transaction as delivered in a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: TransactionId,
    pub data: TransactionInput,
}

impl Record {
    /// Decodes a stored payload.
    pub fn decode(id: TransactionId, payload: &Payload) -> ResultEngine<Self> {
        let data = serde_json::from_value(serde_json::Value::Object(payload.clone()))
            .map_err(|err| EngineError::InvalidRecord(format!("{id}: {err}")))?;
        Ok(Self { id, data })
    }
}

/// A transaction annotated with the running balance right after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub date: DateTime<Utc>,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Rupiah,
    pub balance: Rupiah,
    #[serde(rename = "buktiUrl", skip_serializing_if = "Option::is_none")]
    pub bukti_url: Option<String>,
}

impl Transaction {
    pub(crate) fn from_record(record: Record, balance: Rupiah) -> Self {
        let Record { id, data } = record;
        Self {
            id,
            date: data.date,
            description: data.description,
            category: data.category,
            kind: data.kind,
            amount: data.amount,
            balance,
            bukti_url: data.bukti_url,
        }
    }

    /// The amount with the sign implied by its type.
    #[must_use]
    pub fn signed_amount(&self) -> Rupiah {
        self.kind.signed(self.amount)
    }

    /// Returns the caller-controlled part, e.g. to prefill an edit form.
    #[must_use]
    pub fn to_input(&self) -> TransactionInput {
        TransactionInput {
            date: self.date,
            description: self.description.clone(),
            category: self.category.clone(),
            kind: self.kind,
            amount: self.amount,
            bukti_url: self.bukti_url.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: DateTimeUtc,
    pub description: String,
    pub category: String,
    pub kind: String,
    pub amount: i64,
    pub bukti_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<(&TransactionId, &TransactionInput)> for ActiveModel {
    fn from((id, input): (&TransactionId, &TransactionInput)) -> Self {
        Self {
            id: ActiveValue::Set(id.to_string()),
            date: ActiveValue::Set(input.date),
            description: ActiveValue::Set(input.description.clone()),
            category: ActiveValue::Set(input.category.clone()),
            kind: ActiveValue::Set(input.kind.as_str().to_string()),
            amount: ActiveValue::Set(input.amount.value()),
            bukti_url: ActiveValue::Set(input.bukti_url.clone()),
        }
    }
}

impl TryFrom<Model> for Record {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TransactionId::from(model.id),
            data: TransactionInput {
                date: model.date,
                description: model.description,
                category: model.category,
                kind: TransactionType::try_from(model.kind.as_str())?,
                amount: Rupiah::new(model.amount),
                bukti_url: model.bukti_url,
            },
        })
    }
}
