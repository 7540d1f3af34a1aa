use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::{
    app::AppState,
    error::{AppError, AppResult},
    model::{CheckResp, CheckTextPayload},
    service, util,
};

pub async fn check_text(
    State(state): State<AppState>,
    Json(payload): Json<CheckTextPayload>,
) -> AppResult<Json<CheckResp>> {
    let results = service::check::run(&state, &payload.text, payload.keywords).await?;
    Ok(Json(CheckResp { results }))
}

/// Multipart upload: one `file` field (.txt or .pdf) and an optional
/// `keywords` field overriding keyword extraction.
pub async fn check_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<CheckResp>> {
    let mut document: Option<(String, Vec<u8>)> = None;
    let mut keywords: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("invalid multipart payload: {err}")))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::BadRequest(format!("failed to read upload: {err}")))?;
                document = Some((file_name, bytes.to_vec()));
            }
            Some("keywords") => {
                let value = field.text().await.map_err(|err| {
                    AppError::BadRequest(format!("failed to read keywords field: {err}"))
                })?;
                keywords = Some(value);
            }
            _ => {}
        }
    }

    let (file_name, bytes) = document
        .ok_or_else(|| AppError::BadRequest("missing \"file\" field".to_string()))?;

    tracing::info!(file = %file_name, size = bytes.len(), "received document upload");
    let text = util::extract::extract_text(&file_name, bytes).await?;

    let results = service::check::run(&state, &text, keywords).await?;
    Ok(Json(CheckResp { results }))
}
