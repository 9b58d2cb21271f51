// Request authentication

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::{
    auth::{authenticate, AuthError},
    log_debug,
    models::User,
};

use super::{ApiContext, ApiError};

/// User authenticated by the bearer credential of the request
pub struct CurrentUser(pub User);

/// Extracts the bearer credential from the headers
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

impl FromRequestParts<ApiContext> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, ctx: &ApiContext) -> Result<Self, Self::Rejection> {
        let logger = &ctx.logger;

        let token = match bearer_token(&parts.headers) {
            Some(t) => t,
            None => {
                log_debug!(logger, "Request without bearer credential");
                return Err(ApiError::Unauthorized);
            }
        };

        match authenticate(ctx.store.as_ref(), &ctx.auth, token).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(
                e @ (AuthError::InvalidCredential
                | AuthError::ExpiredCredential
                | AuthError::SessionSuperseded
                | AuthError::UnknownUser(_)),
            ) => {
                log_debug!(logger, format!("Authentication failed: {}", e));
                Err(ApiError::Unauthorized)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Fails with 403 unless the user is an admin
pub fn require_admin(user: &User) -> Result<(), ApiError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("You are not allowed to perform this action"))
    }
}

/// Fails with 403 unless the user is an admin or an inspector
pub fn require_editor(user: &User) -> Result<(), ApiError> {
    if user.role.can_edit_reports() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("You are not allowed to perform this action"))
    }
}

// Tests
