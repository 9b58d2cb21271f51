// Account endpoints: registration, login, session and profile

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{hash_password, login, logout, verify_password, MIN_PASSWORD_LENGTH},
    log_debug, log_info,
    models::{Role, User, UserInfo, UserPatch},
    utils::string_compare_constant_time,
};

use super::{ApiContext, ApiError, CurrentUser, MessageResponse};

/// Number of digits of email verification codes
const VERIFICATION_CODE_DIGITS: usize = 6;

fn generate_verification_code() -> String {
    format!(
        "{:0width$}",
        rand::random_range(0..10u32.pow(VERIFICATION_CODE_DIGITS as u32)),
        width = VERIFICATION_CODE_DIGITS
    )
}

/// Checks a new password and its confirmation
pub fn check_new_password(password: &str, confirmation: &str) -> Result<(), ApiError> {
    if password != confirmation {
        return Err(ApiError::BadRequest("Passwords do not match".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    Ok(())
}

/// Checks that an email and a username are not used by another account
pub async fn check_unique_account(
    ctx: &ApiContext,
    email: &str,
    username: &str,
    exclude_id: Option<&str>,
) -> Result<(), ApiError> {
    if let Some(existing) = ctx.store.find_user_by_email(email).await? {
        if Some(existing.id.as_str()) != exclude_id {
            return Err(ApiError::BadRequest("Email already registered".to_string()));
        }
    }

    if let Some(existing) = ctx.store.find_user_by_username(username).await? {
        if Some(existing.id.as_str()) != exclude_id {
            return Err(ApiError::BadRequest("Username already taken".to_string()));
        }
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub firm_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
}

/// POST /api/auth/register
///
/// Self registration is only open to firms that already have reports
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserInfo>, ApiError> {
    check_new_password(&req.password, &req.password_confirm)?;

    let firm_known = ctx
        .store
        .list_reports()
        .await?
        .iter()
        .any(|r| r.firm == req.firm_name);

    if !firm_known {
        return Err(ApiError::NotFound("FIRM_NOT_FOUND"));
    }

    check_unique_account(&ctx, &req.email, &req.username, None).await?;

    let mut user = User::new(
        &req.username,
        &req.email,
        hash_password(&req.password)?,
        Role::Viewer,
    );

    user.firm_name = Some(req.firm_name);
    user.first_name = req.first_name;
    user.last_name = req.last_name;
    user.city = req.city;
    user.birth_date = req.birth_date;
    user.phone = req.phone;

    let code = generate_verification_code();
    user.verification_code = Some(code.clone());

    ctx.store.insert_user(&user).await?;

    let logger = &ctx.logger;
    log_info!(
        logger,
        format!("Registered user {} ({})", user.username, user.email)
    );
    log_debug!(logger, format!("Verification code for {}: {}", user.email, code));

    Ok(Json(user.to_info()))
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

/// POST /api/auth/verify-email
pub async fn verify_email(
    State(ctx): State<ApiContext>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = ctx
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    if user.email_verified {
        return Err(ApiError::BadRequest("Email already verified".to_string()));
    }

    let code_matches = match &user.verification_code {
        Some(code) => string_compare_constant_time(code, &req.code),
        None => false,
    };

    if !code_matches {
        return Err(ApiError::BadRequest("Invalid verification code".to_string()));
    }

    let patch = UserPatch {
        email_verified: Some(true),
        verification_code: Some(None),
        ..Default::default()
    };

    ctx.store
        .patch_user(&user.id, &patch)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(MessageResponse::new("Email verified")))
}

#[derive(Debug, Deserialize)]
pub struct ResendCodeRequest {
    pub email: String,
}

/// POST /api/auth/resend-code
pub async fn resend_code(
    State(ctx): State<ApiContext>,
    Json(req): Json<ResendCodeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = ctx
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    if user.email_verified {
        return Err(ApiError::BadRequest("Email already verified".to_string()));
    }

    let code = generate_verification_code();

    let patch = UserPatch {
        verification_code: Some(Some(code.clone())),
        ..Default::default()
    };

    ctx.store
        .patch_user(&user.id, &patch)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    let logger = &ctx.logger;
    log_info!(logger, format!("New verification code sent to {}", user.email));
    log_debug!(logger, format!("Verification code for {}: {}", user.email, code));

    Ok(Json(MessageResponse::new("Verification code sent")))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserInfo,
}

/// POST /api/auth/login
pub async fn login_handler(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = login(
        ctx.store.as_ref(),
        &ctx.logger,
        &ctx.auth,
        &req.email,
        &req.password,
        Utc::now(),
    )
    .await?;

    Ok(Json(LoginResponse {
        access_token: outcome.access_token,
        token_type: "bearer".to_string(),
        user: outcome.user.to_info(),
    }))
}

/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserInfo> {
    Json(user.to_info())
}

/// POST /api/auth/logout
pub async fn logout_handler(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    logout(ctx.store.as_ref(), &user.id).await?;

    let logger = &ctx.logger;
    log_info!(logger, format!("User logged out: {}", user.username));

    Ok(Json(MessageResponse::new("Logged out")))
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<UserInfo>, ApiError> {
    let patch = UserPatch {
        first_name: req.first_name,
        last_name: req.last_name,
        city: req.city,
        birth_date: req.birth_date,
        phone: req.phone,
        ..Default::default()
    };

    let updated = ctx
        .store
        .patch_user(&user.id, &patch)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(updated.to_info()))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// PUT /api/auth/change-password
pub async fn change_password(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !verify_password(&req.current_password, &user.password_hash) {
        return Err(ApiError::BadRequest("Current password is incorrect".to_string()));
    }

    check_new_password(&req.new_password, &req.new_password_confirm)?;

    let patch = UserPatch {
        password_hash: Some(hash_password(&req.new_password)?),
        ..Default::default()
    };

    ctx.store
        .patch_user(&user.id, &patch)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(MessageResponse::new("Password changed")))
}

// Tests
