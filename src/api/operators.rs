// Operator endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::{
    log_info,
    models::{NewOperator, Operator, OperatorUpdate},
    store::{delete_record, find_record, insert_record, list_records, patch_record},
};

use super::{
    projects::referenced_project_name, require_admin, require_editor, ApiContext, ApiError,
    BulkDeleteResponse, CurrentUser, MessageResponse,
};

/// GET /api/operators
pub async fn list_operators(
    State(ctx): State<ApiContext>,
    _user: CurrentUser,
) -> Result<Json<Vec<Operator>>, ApiError> {
    Ok(Json(list_records(ctx.store.as_ref()).await?))
}

/// GET /api/operators/{id}
pub async fn get_operator(
    State(ctx): State<ApiContext>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Operator>, ApiError> {
    find_record(ctx.store.as_ref(), &id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Operator not found"))
}

/// POST /api/operators
pub async fn create_operator(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(fields): Json<NewOperator>,
) -> Result<Json<Operator>, ApiError> {
    require_editor(&user)?;

    if fields.certificate_number.trim().is_empty() {
        return Err(ApiError::BadRequest("Certificate number is required".to_string()));
    }

    let project_name = referenced_project_name(&ctx, &fields.project_id).await?;

    let operator = Operator::from_fields(fields, &project_name, Utc::now());
    insert_record(ctx.store.as_ref(), &operator).await?;

    let logger = &ctx.logger;
    log_info!(
        logger,
        format!("Operator created: {} by {}", operator.certificate_number, user.username)
    );

    Ok(Json(operator))
}

/// PUT /api/operators/{id}
pub async fn update_operator(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(mut update): Json<OperatorUpdate>,
) -> Result<Json<Operator>, ApiError> {
    require_editor(&user)?;

    if let Some(project_id) = &update.project_id {
        update.project_name = Some(referenced_project_name(&ctx, project_id).await?);
    }

    if let Some(number) = &update.certificate_number {
        let number = number.trim().to_string();

        if number.is_empty() {
            return Err(ApiError::BadRequest("Certificate number is required".to_string()));
        }

        update.certificate_number = Some(number);
    }

    update.updated_at = Some(Utc::now());

    patch_record(ctx.store.as_ref(), &id, &update)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Operator not found"))
}

/// DELETE /api/operators/{id}
pub async fn delete_operator(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&user)?;

    if !delete_record::<Operator>(ctx.store.as_ref(), &id).await? {
        return Err(ApiError::NotFound("Operator not found"));
    }

    Ok(Json(MessageResponse::new("Operator deleted")))
}

/// POST /api/operators/bulk-delete
pub async fn bulk_delete_operators(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(ids): Json<Vec<String>>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    require_admin(&user)?;

    let mut deleted = 0;

    for id in ids.iter() {
        if delete_record::<Operator>(ctx.store.as_ref(), id).await? {
            deleted += 1;
        }
    }

    Ok(Json(BulkDeleteResponse::new("operators", deleted)))
}
