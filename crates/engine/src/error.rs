//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a transaction is missing a required field or
//!   its amount is out of range.
//! - [`NullField`] thrown when a write payload carries a `null` placeholder.
//! - [`Upload`] thrown when the attachment upload gating a save fails.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`NullField`]: EngineError::NullField
//!  [`Upload`]: EngineError::Upload
use sea_orm::DbErr;
use thiserror::Error;

use crate::attachments::UploadError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid transaction: {0}")]
    Validation(String),
    #[error("\"{0}\" must be omitted, not null")]
    NullField(String),
    #[error("Invalid month index: {0}")]
    InvalidMonth(u32),
    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),
    #[error("Attachment upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NullField(a), Self::NullField(b)) => a == b,
            (Self::InvalidMonth(a), Self::InvalidMonth(b)) => a == b,
            (Self::InvalidRecord(a), Self::InvalidRecord(b)) => a == b,
            (Self::Upload(a), Self::Upload(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
