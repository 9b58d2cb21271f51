// Calibration device endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::{
    models::{new_entity_id, CalibrationDevice, CalibrationDeviceFields},
    store::{delete_record, insert_record, list_records, patch_record},
};

use super::{require_admin, ApiContext, ApiError, CurrentUser, MessageResponse};

/// GET /api/calibration-devices
pub async fn list_calibration_devices(
    State(ctx): State<ApiContext>,
    _user: CurrentUser,
) -> Result<Json<Vec<CalibrationDevice>>, ApiError> {
    Ok(Json(list_records(ctx.store.as_ref()).await?))
}

/// POST /api/calibration-devices
pub async fn create_calibration_device(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(fields): Json<CalibrationDeviceFields>,
) -> Result<Json<CalibrationDevice>, ApiError> {
    require_admin(&user)?;

    let device = CalibrationDevice {
        id: new_entity_id(),
        device_name: fields.device_name,
        serial_number: fields.serial_number,
        calibration_date: fields.calibration_date,
        created_at: Utc::now(),
        created_by: Some(user.id),
        created_by_username: Some(user.username),
    };

    insert_record(ctx.store.as_ref(), &device).await?;

    Ok(Json(device))
}

/// PUT /api/calibration-devices/{id}
///
/// Replaces the name, serial number and calibration date
pub async fn update_calibration_device(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(fields): Json<CalibrationDeviceFields>,
) -> Result<Json<CalibrationDevice>, ApiError> {
    require_admin(&user)?;

    patch_record(ctx.store.as_ref(), &id, &fields)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Calibration device not found"))
}

/// DELETE /api/calibration-devices/{id}
pub async fn delete_calibration_device(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&user)?;

    if !delete_record::<CalibrationDevice>(ctx.store.as_ref(), &id).await? {
        return Err(ApiError::NotFound("Calibration device not found"));
    }

    Ok(Json(MessageResponse::new("Calibration device deleted")))
}
