// Report endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    models::{NewReport, Report, ReportUpdate},
    reports::{self, ReportQuery},
};

use super::{ApiContext, ApiError, BulkDeleteResponse, CurrentUser, MessageResponse};

/// GET /api/reports
pub async fn list_reports(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<Report>>, ApiError> {
    Ok(Json(
        reports::list_reports(ctx.store.as_ref(), &user, &query).await?,
    ))
}

/// GET /api/reports/{id}
pub async fn get_report(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    Ok(Json(reports::get_report(ctx.store.as_ref(), &user, &id).await?))
}

/// POST /api/reports
pub async fn create_report(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(fields): Json<NewReport>,
) -> Result<Json<Report>, ApiError> {
    let report =
        reports::create_report(ctx.store.as_ref(), &ctx.logger, &user, fields, Utc::now()).await?;

    Ok(Json(report))
}

/// PUT /api/reports/{id}
pub async fn update_report(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(update): Json<ReportUpdate>,
) -> Result<Json<Report>, ApiError> {
    let report =
        reports::update_report(ctx.store.as_ref(), &user, &id, update, Utc::now()).await?;

    Ok(Json(report))
}

/// DELETE /api/reports/{id}
pub async fn delete_report(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    reports::delete_report(ctx.store.as_ref(), &ctx.logger, &user, &id).await?;

    Ok(Json(MessageResponse::new("Report deleted")))
}

/// PATCH /api/reports/{id}/status
pub async fn toggle_report_status(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    let report =
        reports::toggle_report_status(ctx.store.as_ref(), &user, &id, Utc::now()).await?;

    Ok(Json(report))
}

/// POST /api/reports/bulk-delete
pub async fn bulk_delete_reports(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(ids): Json<Vec<String>>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    let deleted =
        reports::bulk_delete_reports(ctx.store.as_ref(), &ctx.logger, &user, &ids).await?;

    Ok(Json(BulkDeleteResponse::new("reports", deleted)))
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub report_ids: Vec<String>,
}

/// POST /api/reports/export
///
/// Responds with the ZIP archive as a download
pub async fn export_reports(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let archive = reports::export_reports(
        ctx.store.as_ref(),
        &ctx.logger,
        &user,
        &req.report_ids,
        Utc::now(),
    )
    .await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        archive.file_name
    ))
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive.data,
    )
        .into_response())
}
