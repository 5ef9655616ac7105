use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::attributes::{
        AttributeList, AttributeWithOptions, CreateAttributeRequest, CreateOptionRequest,
        UpdateAttributeRequest, UpdateOptionRequest,
    },
    entity::attribute_options::{
        ActiveModel as OptionActive, Column as OptionCol, Entity as AttributeOptions,
        Model as OptionModel,
    },
    entity::attributes::{
        ActiveModel as AttributeActive, Column as AttributeCol, Entity as Attributes,
        Model as AttributeModel,
    },
    entity::categories::Entity as Categories,
    error::{AppError, AppResult},
    models::{Attribute, AttributeOption},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::{attribute_handle_from_name, validate_display_name},
};

/// List attributes with their options, both in display order. This is the
/// snapshot shape the matching resolver consumes.
pub async fn list_attributes(state: &AppState) -> AppResult<ApiResponse<AttributeList>> {
    let attributes = Attributes::find()
        .order_by_asc(AttributeCol::DisplayOrder)
        .order_by_asc(AttributeCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let options = AttributeOptions::find()
        .order_by_asc(OptionCol::DisplayOrder)
        .order_by_asc(OptionCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = attributes
        .into_iter()
        .map(|attribute| {
            let attribute_options = options
                .iter()
                .filter(|o| o.attribute_id == attribute.id)
                .cloned()
                .map(option_from_entity)
                .collect();
            AttributeWithOptions {
                attribute: attribute_from_entity(attribute),
                options: attribute_options,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Attributes",
        AttributeList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_attribute(
    state: &AppState,
    payload: CreateAttributeRequest,
) -> AppResult<ApiResponse<Attribute>> {
    validate_display_name(&payload.name, "Attribute").map_err(AppError::BadRequest)?;
    let handle = payload
        .handle
        .unwrap_or_else(|| attribute_handle_from_name(&payload.name));
    if handle.is_empty() {
        return Err(AppError::BadRequest("handle cannot be empty".into()));
    }

    let max_order = Attributes::find()
        .order_by_desc(AttributeCol::DisplayOrder)
        .one(&state.orm)
        .await?
        .map(|a| a.display_order)
        .unwrap_or(-1);

    let active = AttributeActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        handle: Set(handle),
        is_category_linked: Set(payload.is_category_linked.unwrap_or(false)),
        is_filterable: Set(payload.is_filterable.unwrap_or(true)),
        display_order: Set(max_order + 1),
        created_at: NotSet,
    };
    let attribute = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "attribute_create",
        Some("product_attributes"),
        Some(serde_json::json!({ "attribute_id": attribute.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Attribute created",
        attribute_from_entity(attribute),
        Some(Meta::empty()),
    ))
}

pub async fn update_attribute(
    state: &AppState,
    id: Uuid,
    payload: UpdateAttributeRequest,
) -> AppResult<ApiResponse<Attribute>> {
    let existing = Attributes::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    let mut active: AttributeActive = existing.into();
    if let Some(name) = payload.name {
        validate_display_name(&name, "Attribute").map_err(AppError::BadRequest)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(is_filterable) = payload.is_filterable {
        active.is_filterable = Set(is_filterable);
    }
    let attribute = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        attribute_from_entity(attribute),
        Some(Meta::empty()),
    ))
}

/// Delete an attribute along with its options and every tag that references
/// them.
pub async fn delete_attribute(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if Attributes::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let mut tx = state.pool.begin().await?;
    sqlx::query("DELETE FROM product_attribute_values WHERE attribute_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM product_attribute_options WHERE attribute_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM product_attributes WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "attribute_delete",
        Some("product_attributes"),
        Some(serde_json::json!({ "attribute_id": id })),
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

pub async fn create_option(
    state: &AppState,
    attribute_id: Uuid,
    payload: CreateOptionRequest,
) -> AppResult<ApiResponse<AttributeOption>> {
    let attribute = Attributes::find_by_id(attribute_id).one(&state.orm).await?;
    let attribute = match attribute {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    validate_display_name(&payload.name, "Option").map_err(AppError::BadRequest)?;
    check_option_scope(state, &attribute, payload.category_id).await?;

    let handle = payload
        .handle
        .unwrap_or_else(|| attribute_handle_from_name(&payload.name));
    if handle.is_empty() {
        return Err(AppError::BadRequest("handle cannot be empty".into()));
    }

    let max_order = AttributeOptions::find()
        .filter(OptionCol::AttributeId.eq(attribute_id))
        .order_by_desc(OptionCol::DisplayOrder)
        .one(&state.orm)
        .await?
        .map(|o| o.display_order)
        .unwrap_or(-1);

    let active = OptionActive {
        id: Set(Uuid::new_v4()),
        attribute_id: Set(attribute_id),
        name: Set(payload.name.trim().to_string()),
        handle: Set(handle),
        category_id: Set(payload.category_id),
        display_order: Set(max_order + 1),
        created_at: NotSet,
    };
    let option = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "attribute_option_create",
        Some("product_attribute_options"),
        Some(serde_json::json!({ "option_id": option.id, "attribute_id": attribute_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Option created",
        option_from_entity(option),
        Some(Meta::empty()),
    ))
}

pub async fn update_option(
    state: &AppState,
    attribute_id: Uuid,
    option_id: Uuid,
    payload: UpdateOptionRequest,
) -> AppResult<ApiResponse<AttributeOption>> {
    let attribute = Attributes::find_by_id(attribute_id).one(&state.orm).await?;
    let attribute = match attribute {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    let existing = AttributeOptions::find_by_id(option_id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) if o.attribute_id == attribute_id => o,
        _ => return Err(AppError::NotFound),
    };

    if payload.category_id.is_some() {
        check_option_scope(state, &attribute, payload.category_id).await?;
    }

    let mut active: OptionActive = existing.into();
    if let Some(name) = payload.name {
        validate_display_name(&name, "Option").map_err(AppError::BadRequest)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    let option = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        option_from_entity(option),
        Some(Meta::empty()),
    ))
}

pub async fn delete_option(
    state: &AppState,
    attribute_id: Uuid,
    option_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    match AttributeOptions::find_by_id(option_id).one(&state.orm).await? {
        Some(o) if o.attribute_id == attribute_id => {}
        _ => return Err(AppError::NotFound),
    }

    let mut tx = state.pool.begin().await?;
    sqlx::query("DELETE FROM product_attribute_values WHERE option_id = $1")
        .bind(option_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM product_attribute_options WHERE id = $1")
        .bind(option_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "attribute_option_delete",
        Some("product_attribute_options"),
        Some(serde_json::json!({ "option_id": option_id })),
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

/// A global attribute's options must not carry a category; a category-linked
/// attribute's options may, and the category must exist.
async fn check_option_scope(
    state: &AppState,
    attribute: &AttributeModel,
    category_id: Option<Uuid>,
) -> AppResult<()> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    if !attribute.is_category_linked {
        return Err(AppError::BadRequest(
            "options of a global attribute cannot be scoped to a category".into(),
        ));
    }
    if Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::InvalidReference(format!(
            "category {category_id} does not exist"
        )));
    }
    Ok(())
}

fn attribute_from_entity(model: AttributeModel) -> Attribute {
    Attribute {
        id: model.id,
        name: model.name,
        handle: model.handle,
        is_category_linked: model.is_category_linked,
        is_filterable: model.is_filterable,
        display_order: model.display_order,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn option_from_entity(model: OptionModel) -> AttributeOption {
    AttributeOption {
        id: model.id,
        attribute_id: model.attribute_id,
        name: model.name,
        handle: model.handle,
        category_id: model.category_id,
        display_order: model.display_order,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
