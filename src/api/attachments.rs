// Attachment endpoints

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{models::Attachment, reports, utils::ascii_file_name};

use super::{ApiContext, ApiError, CurrentUser, MessageResponse};

/// File of the upload directory to attach to a report
#[derive(Debug, Deserialize)]
pub struct AttachmentRegistration {
    /// Location relative to the upload directory
    pub path: String,

    /// Name shown for the file
    pub file_name: Option<String>,
}

/// GET /api/reports/{id}/attachments
pub async fn list_attachments(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(report_id): Path<String>,
) -> Result<Json<Vec<Attachment>>, ApiError> {
    Ok(Json(
        reports::list_report_attachments(ctx.store.as_ref(), &user, &report_id).await?,
    ))
}

/// POST /api/reports/{id}/attachments
pub async fn register_attachment(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(report_id): Path<String>,
    Json(req): Json<AttachmentRegistration>,
) -> Result<Json<Attachment>, ApiError> {
    let attachment = reports::register_attachment(
        ctx.store.as_ref(),
        &ctx.logger,
        &ctx.upload_dir,
        &user,
        &report_id,
        req.file_name.as_deref(),
        &req.path,
        Utc::now(),
    )
    .await?;

    Ok(Json(attachment))
}

/// GET /api/attachments/{id}/download
///
/// Serves the file inline, so browsers can preview images and PDFs
pub async fn download_attachment(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let file = reports::read_attachment(ctx.store.as_ref(), &user, &id).await?;

    let disposition = HeaderValue::from_str(&format!(
        "inline; filename=\"{}\"",
        ascii_file_name(&file.attachment.file_name, ".-_ ()")
    ))
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=3600"),
            ),
        ],
        file.data,
    )
        .into_response())
}

/// DELETE /api/attachments/{id}
pub async fn delete_attachment(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    reports::delete_attachment(ctx.store.as_ref(), &ctx.logger, &user, &id).await?;

    Ok(Json(MessageResponse::new("Attachment deleted")))
}
