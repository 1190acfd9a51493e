use api_types::attachment::AttachmentUploaded;
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, transactions::read_upload};

/// Uploads the `file` part on its own and returns its URL.
pub async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AttachmentUploaded>), ServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServerError::Generic(err.body_text()))?
    {
        if field.name() == Some("file") {
            let file = read_upload(field).await?;
            let url = state.attachments.upload(file).await?;
            tracing::info!(%url, "attachment uploaded");
            return Ok((StatusCode::CREATED, Json(AttachmentUploaded { url })));
        }
    }

    Err(ServerError::Generic("missing file part".to_string()))
}
