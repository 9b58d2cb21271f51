// Dashboard endpoint

use axum::{extract::State, Json};
use chrono::Utc;

use crate::reports::{self, DashboardStats};

use super::{ApiContext, ApiError, CurrentUser};

/// GET /api/dashboard/stats
pub async fn dashboard_stats(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DashboardStats>, ApiError> {
    if !user.role.can_edit_reports() {
        return Err(ApiError::Forbidden("You are not allowed to access the dashboard"));
    }

    Ok(Json(
        reports::dashboard_stats(ctx.store.as_ref(), &user, Utc::now()).await?,
    ))
}
