// Category endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::models::{Category, CategoryFields};

use super::{require_admin, ApiContext, ApiError, BulkDeleteResponse, CurrentUser, MessageResponse};

/// GET /api/categories
pub async fn list_categories(
    State(ctx): State<ApiContext>,
    _user: CurrentUser,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(ctx.store.list_categories().await?))
}

/// POST /api/categories
pub async fn create_category(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(fields): Json<CategoryFields>,
) -> Result<Json<Category>, ApiError> {
    require_admin(&user)?;

    if fields.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Category name is required".to_string()));
    }

    let category = Category::from_fields(fields);
    ctx.store.insert_category(&category).await?;

    Ok(Json(category))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(fields): Json<CategoryFields>,
) -> Result<Json<Category>, ApiError> {
    require_admin(&user)?;

    let mut category = ctx
        .store
        .find_category(&id)
        .await?
        .ok_or(ApiError::NotFound("Category not found"))?;

    category.name = fields.name;
    category.subcategories = fields.subcategories;
    category.description = fields.description;

    ctx.store.update_category(&category).await?;

    Ok(Json(category))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_admin(&user)?;

    if !ctx.store.delete_category(&id).await? {
        return Err(ApiError::NotFound("Category not found"));
    }

    Ok(Json(MessageResponse::new("Category deleted")))
}

/// POST /api/categories/bulk-delete
pub async fn bulk_delete_categories(
    State(ctx): State<ApiContext>,
    CurrentUser(user): CurrentUser,
    Json(ids): Json<Vec<String>>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    require_admin(&user)?;

    let mut deleted = 0;

    for id in ids.iter() {
        if ctx.store.delete_category(id).await? {
            deleted += 1;
        }
    }

    Ok(Json(BulkDeleteResponse::new("categories", deleted)))
}
