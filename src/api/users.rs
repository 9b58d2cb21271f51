// User administration endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{
    auth::hash_password,
    log_info,
    models::{Role, User, UserInfo, UserPatch},
};

use super::{
    check_new_password, check_unique_account, require_admin, ApiContext, ApiError,
    BulkDeleteResponse, CurrentUser, MessageResponse,
};

/// GET /api/users
pub async fn list_users(
    State(ctx): State<ApiContext>,
    CurrentUser(admin): CurrentUser,
) -> Result<Json<Vec<UserInfo>>, ApiError> {
    require_admin(&admin)?;

    let users = ctx.store.list_users().await?;

    Ok(Json(users.iter().map(|u| u.to_info()).collect()))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub role: Role,
    pub firm_name: Option<String>,
}

/// POST /api/users
///
/// Accounts created by an admin are verified from the start
pub async fn create_user(
    State(ctx): State<ApiContext>,
    CurrentUser(admin): CurrentUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserInfo>, ApiError> {
    require_admin(&admin)?;

    check_new_password(&req.password, &req.password_confirm)?;
    check_unique_account(&ctx, &req.email, &req.username, None).await?;

    let mut user = User::new(
        &req.username,
        &req.email,
        hash_password(&req.password)?,
        req.role,
    );

    user.firm_name = req.firm_name;
    user.email_verified = true;

    ctx.store.insert_user(&user).await?;

    let logger = &ctx.logger;
    log_info!(
        logger,
        format!("User {} created by {}", user.username, admin.username)
    );

    Ok(Json(user.to_info()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub firm_name: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(ctx): State<ApiContext>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserInfo>, ApiError> {
    require_admin(&admin)?;

    let user = ctx
        .store
        .find_user(&id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    let mut patch = UserPatch {
        username: req.username.filter(|u| !u.is_empty()),
        email: req.email.filter(|e| !e.is_empty()),
        role: req.role,
        firm_name: req.firm_name,
        ..Default::default()
    };

    check_unique_account(
        &ctx,
        patch.email.as_deref().unwrap_or(&user.email),
        patch.username.as_deref().unwrap_or(&user.username),
        Some(&user.id),
    )
    .await?;

    if let Some(password) = req.password.filter(|p| !p.is_empty()) {
        check_new_password(&password, req.password_confirm.as_deref().unwrap_or(""))?;
        patch.password_hash = Some(hash_password(&password)?);
    }

    let updated = ctx
        .store
        .patch_user(&user.id, &patch)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(updated.to_info()))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(ctx): State<ApiContext>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&admin)?;

    if id == admin.id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    if !ctx.store.delete_user(&id).await? {
        return Err(ApiError::NotFound("User not found"));
    }

    let logger = &ctx.logger;
    log_info!(logger, format!("User {} deleted by {}", id, admin.username));

    Ok(Json(MessageResponse::new("User deleted")))
}

/// POST /api/users/bulk-delete
///
/// The account of the requesting admin is never deleted
pub async fn bulk_delete_users(
    State(ctx): State<ApiContext>,
    CurrentUser(admin): CurrentUser,
    Json(ids): Json<Vec<String>>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    require_admin(&admin)?;

    let mut deleted = 0;

    for id in ids.iter().filter(|id| **id != admin.id) {
        if ctx.store.delete_user(id).await? {
            deleted += 1;
        }
    }

    if deleted == 0 {
        return Err(ApiError::BadRequest(
            "No users to delete, your own account cannot be deleted".to_string(),
        ));
    }

    Ok(Json(BulkDeleteResponse::new("users", deleted)))
}
