// Project endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::models::{Project, ProjectFields};

use super::{require_admin, ApiContext, ApiError, BulkDeleteResponse, CurrentUser, MessageResponse};

/// GET /api/projects
pub async fn list_projects(
    State(ctx): State<ApiContext>,
    _user: CurrentUser,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(ctx.store.list_projects().await?))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(ctx): State<ApiContext>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    ctx.store
        .find_project(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Project not found"))
}

/// POST /api/projects
pub async fn create_project(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(fields): Json<ProjectFields>,
) -> Result<Json<Project>, ApiError> {
    require_admin(&user)?;

    let project = Project::from_fields(fields);
    ctx.store.insert_project(&project).await?;

    Ok(Json(project))
}

/// PUT /api/projects/{id}
pub async fn update_project(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(fields): Json<ProjectFields>,
) -> Result<Json<Project>, ApiError> {
    require_admin(&user)?;

    let mut project = ctx
        .store
        .find_project(&id)
        .await?
        .ok_or(ApiError::NotFound("Project not found"))?;

    project.apply_fields(fields);
    ctx.store.update_project(&project).await?;

    Ok(Json(project))
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&user)?;

    if !ctx.store.delete_project(&id).await? {
        return Err(ApiError::NotFound("Project not found"));
    }

    Ok(Json(MessageResponse::new("Project deleted")))
}

/// POST /api/projects/bulk-delete
pub async fn bulk_delete_projects(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(ids): Json<Vec<String>>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    require_admin(&user)?;

    let mut deleted = 0;

    for id in ids.iter() {
        if ctx.store.delete_project(id).await? {
            deleted += 1;
        }
    }

    Ok(Json(BulkDeleteResponse::new("projects", deleted)))
}

/// Name of a project referenced by another resource
pub(super) async fn referenced_project_name(ctx: &ApiContext, id: &str) -> Result<String, ApiError> {
    ctx.store
        .find_project(id)
        .await?
        .map(|p| p.name)
        .ok_or(ApiError::NotFound("Project not found"))
}
