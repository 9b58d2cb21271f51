// Machine endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::{
    log_info,
    models::{Machine, MachineUpdate, NewMachine},
    store::{delete_record, find_record, insert_record, list_records, patch_record},
};

use super::{
    projects::referenced_project_name, require_admin, require_editor, ApiContext, ApiError,
    BulkDeleteResponse, CurrentUser, MessageResponse,
};

/// GET /api/machines
pub async fn list_machines(
    State(ctx): State<ApiContext>,
    _user: CurrentUser,
) -> Result<Json<Vec<Machine>>, ApiError> {
    Ok(Json(list_records(ctx.store.as_ref()).await?))
}

/// GET /api/machines/{id}
pub async fn get_machine(
    State(ctx): State<ApiContext>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Machine>, ApiError> {
    find_record(ctx.store.as_ref(), &id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Machine not found"))
}

/// POST /api/machines
pub async fn create_machine(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(fields): Json<NewMachine>,
) -> Result<Json<Machine>, ApiError> {
    require_editor(&user)?;

    if fields.plate_or_serial.trim().is_empty() {
        return Err(ApiError::BadRequest("Plate or serial number is required".to_string()));
    }

    let project_name = referenced_project_name(&ctx, &fields.project_id).await?;

    let machine = Machine::from_fields(fields, &project_name, Utc::now());
    insert_record(ctx.store.as_ref(), &machine).await?;

    let logger = &ctx.logger;
    log_info!(
        logger,
        format!("Machine created: {} by {}", machine.plate_or_serial, user.username)
    );

    Ok(Json(machine))
}

/// PUT /api/machines/{id}
pub async fn update_machine(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(mut update): Json<MachineUpdate>,
) -> Result<Json<Machine>, ApiError> {
    require_editor(&user)?;

    if let Some(project_id) = &update.project_id {
        update.project_name = Some(referenced_project_name(&ctx, project_id).await?);
    }

    if let Some(plate) = &update.plate_or_serial {
        let plate = plate.trim().to_string();

        if plate.is_empty() {
            return Err(ApiError::BadRequest("Plate or serial number is required".to_string()));
        }

        update.plate_or_serial = Some(plate);
    }

    update.updated_at = Some(Utc::now());

    patch_record(ctx.store.as_ref(), &id, &update)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Machine not found"))
}

/// DELETE /api/machines/{id}
pub async fn delete_machine(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&user)?;

    if !delete_record::<Machine>(ctx.store.as_ref(), &id).await? {
        return Err(ApiError::NotFound("Machine not found"));
    }

    Ok(Json(MessageResponse::new("Machine deleted")))
}

/// POST /api/machines/bulk-delete
pub async fn bulk_delete_machines(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(ids): Json<Vec<String>>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    require_admin(&user)?;

    let mut deleted = 0;

    for id in ids.iter() {
        if delete_record::<Machine>(ctx.store.as_ref(), id).await? {
            deleted += 1;
        }
    }

    Ok(Json(BulkDeleteResponse::new("machines", deleted)))
}
