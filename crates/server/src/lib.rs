use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{Clock, ServerState, router, run, run_with_listener, spawn_with_listener};

mod attachments;
mod categories;
mod server;
mod statistics;
mod transactions;

pub mod types {
    pub mod transaction {
        pub use api_types::transaction::{
            TransactionCreated, TransactionListQuery, TransactionListResponse, TransactionSave,
            TransactionType, TransactionView, TypeFilter,
        };
    }

    pub mod summary {
        pub use api_types::summary::Summary;
    }

    pub mod chart {
        pub use api_types::chart::{ChartMonth, ChartQuery, MonthlyChart};
    }

    pub mod category {
        pub use api_types::category::{Categories, CategoriesQuery};
    }

    pub mod attachment {
        pub use api_types::attachment::AttachmentUploaded;
    }
}

pub enum ServerError {
    Engine(EngineError),
    /// Malformed request: bad query, missing multipart part, undecodable body.
    Generic(String),
    /// Well-formed request rejected by a form rule.
    Unprocessable(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) | EngineError::NullField(_) | EngineError::InvalidMonth(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::Upload(_) => StatusCode::BAD_GATEWAY,
        EngineError::InvalidRecord(_) | EngineError::Database(_) | EngineError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Io(io_err) => {
            tracing::error!("io error: {io_err}");
            "internal server error".to_string()
        }
        EngineError::InvalidRecord(msg) => {
            tracing::error!("invalid record: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Unprocessable(err) => (StatusCode::UNPROCESSABLE_ENTITY, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<engine::UploadError> for ServerError {
    fn from(value: engine::UploadError) -> Self {
        Self::Engine(EngineError::Upload(value))
    }
}
