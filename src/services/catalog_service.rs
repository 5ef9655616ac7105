use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::catalog::{
        CategoryList, CreateCategoryRequest, CreateProductTypeRequest, ProductTypeList,
        UpdateCategoryRequest, UpdateProductTypeRequest,
    },
    entity::categories::{
        ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
        Model as CategoryModel,
    },
    entity::product_types::{
        ActiveModel as ProductTypeActive, Column as ProductTypeCol, Entity as ProductTypes,
        Model as ProductTypeModel,
    },
    error::{AppError, AppResult},
    models::{Category, ProductType},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::{handle_from_name, validate_display_name},
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    state: &AppState,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    validate_display_name(&payload.name, "Category").map_err(AppError::BadRequest)?;
    let handle = payload
        .handle
        .unwrap_or_else(|| handle_from_name(&payload.name));
    if handle.is_empty() {
        return Err(AppError::BadRequest("handle cannot be empty".into()));
    }

    let active = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        handle: Set(handle),
        created_at: NotSet,
    };
    let category = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "category_create",
        Some("product_categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let mut active: CategoryActive = existing.into();
    if let Some(name) = payload.name {
        validate_display_name(&name, "Category").map_err(AppError::BadRequest)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(handle) = payload.handle {
        if handle.is_empty() {
            return Err(AppError::BadRequest("handle cannot be empty".into()));
        }
        active.handle = Set(handle);
    }
    let category = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

/// Delete a category. Referencing attribute options and products are
/// un-scoped (`category_id` cleared) in the same transaction; no cascade is
/// delegated to the store.
pub async fn delete_category(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if Categories::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let mut tx = state.pool.begin().await?;
    sqlx::query("UPDATE product_attribute_options SET category_id = NULL WHERE category_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE products SET category_id = NULL WHERE category_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM product_categories WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "category_delete",
        Some("product_categories"),
        Some(serde_json::json!({ "category_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn list_product_types(state: &AppState) -> AppResult<ApiResponse<ProductTypeList>> {
    let items = ProductTypes::find()
        .order_by_asc(ProductTypeCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_type_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Product types",
        ProductTypeList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_product_type(
    state: &AppState,
    payload: CreateProductTypeRequest,
) -> AppResult<ApiResponse<ProductType>> {
    validate_display_name(&payload.name, "Product type").map_err(AppError::BadRequest)?;

    let active = ProductTypeActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        is_addon: Set(payload.is_addon.unwrap_or(false)),
        created_at: NotSet,
    };
    let product_type = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_type_create",
        Some("product_types"),
        Some(serde_json::json!({ "product_type_id": product_type.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product type created",
        product_type_from_entity(product_type),
        Some(Meta::empty()),
    ))
}

pub async fn update_product_type(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductTypeRequest,
) -> AppResult<ApiResponse<ProductType>> {
    let existing = ProductTypes::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(t) => t,
        None => return Err(AppError::NotFound),
    };

    let mut active: ProductTypeActive = existing.into();
    if let Some(name) = payload.name {
        validate_display_name(&name, "Product type").map_err(AppError::BadRequest)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(is_addon) = payload.is_addon {
        active.is_addon = Set(is_addon);
    }
    let product_type = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        product_type_from_entity(product_type),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product_type(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if ProductTypes::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let mut tx = state.pool.begin().await?;
    sqlx::query("UPDATE products SET product_type_id = NULL WHERE product_type_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM product_types WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_type_delete",
        Some("product_types"),
        Some(serde_json::json!({ "product_type_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        handle: model.handle,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn product_type_from_entity(model: ProductTypeModel) -> ProductType {
    ProductType {
        id: model.id,
        name: model.name,
        is_addon: model.is_addon,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
