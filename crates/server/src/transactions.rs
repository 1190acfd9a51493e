//! Transactions API endpoints

use api_types::transaction::{
    TransactionCreated, TransactionListQuery, TransactionListResponse, TransactionSave,
    TransactionType as ApiType, TransactionView, TypeFilter as ApiFilter,
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::{Utc, offset::Offset};
use chrono_tz::Tz;
use engine::{
    AttachmentUpload, MonthFilter, SaveTransaction, Transaction, TransactionId, TransactionInput,
    TransactionType, TypeFilter, ViewSpec,
    format::{format_date, format_idr, format_time},
    views,
};

use crate::{ServerError, server::ServerState};

pub(crate) fn map_type(kind: TransactionType) -> ApiType {
    match kind {
        TransactionType::Debit => ApiType::Debit,
        TransactionType::Credit => ApiType::Credit,
    }
}

pub(crate) fn engine_type(kind: ApiType) -> TransactionType {
    match kind {
        ApiType::Debit => TransactionType::Debit,
        ApiType::Credit => TransactionType::Credit,
    }
}

fn map_filter(filter: ApiFilter) -> TypeFilter {
    match filter {
        ApiFilter::All => TypeFilter::All,
        ApiFilter::Debit => TypeFilter::Debit,
        ApiFilter::Credit => TypeFilter::Credit,
    }
}

fn view(tx: &Transaction, tz: Tz) -> TransactionView {
    let local = tx.date.with_timezone(&tz);
    TransactionView {
        id: tx.id.to_string(),
        date: local.with_timezone(&local.offset().fix()),
        date_label: format_date(tx.date, tz),
        time_label: format_time(tx.date, tz),
        description: tx.description.clone(),
        category: tx.category.clone(),
        kind: map_type(tx.kind),
        amount: tx.amount.value(),
        amount_label: format_idr(tx.amount),
        balance: tx.balance.value(),
        balance_label: format_idr(tx.balance),
        bukti_url: tx.bukti_url.clone(),
    }
}

/// Converts the request body, enforcing the category set of its type.
fn to_input(payload: TransactionSave) -> Result<TransactionInput, ServerError> {
    let kind = engine_type(payload.kind);
    if !kind.allows_category(&payload.category) {
        return Err(ServerError::Unprocessable(format!(
            "category \"{}\" is not allowed for {kind} transactions",
            payload.category
        )));
    }

    Ok(TransactionInput {
        date: payload.date.with_timezone(&Utc),
        description: payload.description,
        category: payload.category,
        kind,
        amount: payload.amount.into(),
        bukti_url: payload.bukti_url,
    })
}

fn month_filter(query: &TransactionListQuery) -> Result<Option<MonthFilter>, ServerError> {
    match (query.month, query.year) {
        (Some(month), Some(year)) => Ok(Some(MonthFilter::new(month, year)?)),
        (None, None) => Ok(None),
        _ => Err(ServerError::Generic(
            "month and year must be given together".to_string(),
        )),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let selection = ViewSpec {
        type_filter: map_filter(query.filter.unwrap_or_default()),
        month: month_filter(&query)?,
    };

    let ledger = state.ledger.current();
    let transactions = views::primary_view(ledger.transactions(), &selection, state.timezone)
        .iter()
        .map(|tx| view(tx, state.timezone))
        .collect();
    let total = ledger.total_balance();

    Ok(Json(TransactionListResponse {
        transactions,
        total_balance: total.value(),
        total_balance_label: format_idr(total),
    }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionSave>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let input = to_input(payload)?;
    let id = state.store.create(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated { id: id.to_string() }),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<TransactionSave>,
) -> Result<StatusCode, ServerError> {
    let input = to_input(payload)?;
    state.store.update(&TransactionId::new(id), &input).await?;
    Ok(StatusCode::OK)
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.store.delete(&TransactionId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Form submission: a `transaction` JSON part, an optional `id` part when
/// editing and an optional `file` part that is uploaded before saving.
pub async fn submit_form(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<TransactionCreated>, ServerError> {
    let mut payload: Option<TransactionSave> = None;
    let mut id: Option<TransactionId> = None;
    let mut upload: Option<AttachmentUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServerError::Generic(err.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("transaction") => {
                let text = field
                    .text()
                    .await
                    .map_err(|err| ServerError::Generic(err.body_text()))?;
                let parsed = serde_json::from_str(&text).map_err(|err| {
                    ServerError::Generic(format!("invalid transaction part: {err}"))
                })?;
                payload = Some(parsed);
            }
            Some("id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|err| ServerError::Generic(err.body_text()))?;
                let text = text.trim();
                if !text.is_empty() {
                    id = Some(TransactionId::new(text));
                }
            }
            Some("file") => {
                upload = Some(read_upload(field).await?);
            }
            _ => {}
        }
    }

    let payload = payload
        .ok_or_else(|| ServerError::Generic("missing transaction part".to_string()))?;
    let save = SaveTransaction {
        id,
        input: to_input(payload)?,
        upload,
    };

    let id = state.store.save(save, state.attachments.as_ref()).await?;
    Ok(Json(TransactionCreated { id: id.to_string() }))
}

pub(crate) async fn read_upload(
    field: axum::extract::multipart::Field<'_>,
) -> Result<AttachmentUpload, ServerError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|err| ServerError::Generic(err.body_text()))?;

    Ok(AttachmentUpload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset};

    use super::*;

    fn save(kind: ApiType, category: &str) -> TransactionSave {
        TransactionSave {
            date: DateTime::<FixedOffset>::parse_from_rfc3339("2024-03-10T08:00:00+07:00").unwrap(),
            description: "Setoran".to_string(),
            category: category.to_string(),
            kind,
            amount: 100_000,
            bukti_url: None,
        }
    }

    #[test]
    fn input_is_normalized_to_utc() {
        let input = to_input(save(ApiType::Debit, "Setoran")).ok().unwrap();
        assert_eq!(input.date.to_rfc3339(), "2024-03-10T01:00:00+00:00");
        assert_eq!(input.kind, TransactionType::Debit);
    }

    #[test]
    fn category_must_match_type() {
        assert!(matches!(
            to_input(save(ApiType::Debit, "Gaji")),
            Err(ServerError::Unprocessable(_))
        ));
        assert!(to_input(save(ApiType::Credit, "Gaji")).is_ok());
    }

    #[test]
    fn month_and_year_go_together() {
        let query = TransactionListQuery {
            filter: None,
            month: Some(2),
            year: None,
        };
        assert!(matches!(month_filter(&query), Err(ServerError::Generic(_))));

        let query = TransactionListQuery {
            filter: None,
            month: Some(12),
            year: Some(2024),
        };
        assert!(matches!(month_filter(&query), Err(ServerError::Engine(_))));
    }
}
