use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{
        CreateProductRequest, ProductDetail, ProductList, SetAttributeValuesRequest,
        UpdateProductRequest,
    },
    entity::attribute_options::{Column as OptionCol, Entity as AttributeOptions},
    entity::attribute_values::{
        ActiveModel as ValueActive, Column as ValueCol, Entity as AttributeValues,
        Model as ValueModel,
    },
    entity::attributes::Entity as Attributes,
    entity::categories::Entity as Categories,
    entity::product_types::Entity as ProductTypes,
    entity::products::{
        ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel,
    },
    error::{AppError, AppResult},
    models::{AttributeValue, Product},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::bundle_service,
    state::AppState,
    validation::validate_display_name,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProdCol::Title).ilike(pattern.clone()))
                .add(Expr::col(ProdCol::Description).ilike(pattern)),
        );
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(ProdCol::CategoryId.eq(category_id));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => ProdCol::CreatedAt,
        ProductSortBy::Price => ProdCol::Price,
        ProductSortBy::Title => ProdCol::Title,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    if let Some(want_addon) = query.addon {
        // The effective add-on flag needs the type default, so this filter
        // runs in memory over the condition-matched rows.
        let type_defaults = product_type_defaults(state).await?;
        let filtered: Vec<ProductModel> = finder
            .all(&state.orm)
            .await?
            .into_iter()
            .filter(|p| {
                let type_default = p.product_type_id.and_then(|t| type_defaults.get(&t).copied());
                p.effective_is_addon(type_default) == want_addon
            })
            .collect();

        let total = filtered.len() as i64;
        let items = filtered
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(product_from_entity)
            .collect();

        let meta = Meta::new(page, limit, total);
        return Ok(ApiResponse::success(
            "Products",
            ProductList { items },
            Some(meta),
        ));
    }

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find_by_id(id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let values = AttributeValues::find()
        .filter(ValueCol::ProductId.eq(id))
        .order_by_asc(ValueCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(value_from_entity)
        .collect();

    let data = ProductDetail {
        product: product_from_entity(product),
        values,
    };
    Ok(ApiResponse::success("Product", data, None))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    validate_display_name(&payload.title, "Product").map_err(AppError::BadRequest)?;
    if payload.price < 0 {
        return Err(AppError::BadRequest("price cannot be negative".into()));
    }
    check_product_refs(state, payload.category_id, payload.product_type_id).await?;

    let active = ProductActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        price: Set(payload.price),
        category_id: Set(payload.category_id),
        product_type_id: Set(payload.product_type_id),
        is_addon: Set(payload.is_addon),
        created_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    check_product_refs(state, payload.category_id, payload.product_type_id).await?;

    let mut active: ProductActive = existing.into();
    if let Some(title) = payload.title {
        validate_display_name(&title, "Product").map_err(AppError::BadRequest)?;
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::BadRequest("price cannot be negative".into()));
        }
        active.price = Set(price);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(product_type_id) = payload.product_type_id {
        active.product_type_id = Set(Some(product_type_id));
    }
    if let Some(is_addon) = payload.is_addon {
        active.is_addon = Set(Some(is_addon));
    }
    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Replace the product's option set for one attribute. Every option must
/// belong to that attribute; a single bad id rejects the whole request so
/// operator mistakes surface instead of being dropped.
pub async fn set_attribute_values(
    state: &AppState,
    product_id: Uuid,
    payload: SetAttributeValuesRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if Attributes::find_by_id(payload.attribute_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::InvalidReference(format!(
            "attribute {} does not exist",
            payload.attribute_id
        )));
    }

    let mut seen = HashSet::new();
    let option_ids: Vec<Uuid> = payload
        .option_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();

    let options = AttributeOptions::find()
        .filter(OptionCol::Id.is_in(option_ids.clone()))
        .all(&state.orm)
        .await?;
    let valid: HashSet<Uuid> = options
        .iter()
        .filter(|o| o.attribute_id == payload.attribute_id)
        .map(|o| o.id)
        .collect();
    let invalid: Vec<String> = option_ids
        .iter()
        .filter(|id| !valid.contains(id))
        .map(|id| id.to_string())
        .collect();
    if !invalid.is_empty() {
        return Err(AppError::InvalidReference(format!(
            "options not found on attribute {}: {}",
            payload.attribute_id,
            invalid.join(", ")
        )));
    }

    let txn = state.orm.begin().await?;
    AttributeValues::delete_many()
        .filter(ValueCol::ProductId.eq(product_id))
        .filter(ValueCol::AttributeId.eq(payload.attribute_id))
        .exec(&txn)
        .await?;
    for option_id in &option_ids {
        ValueActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            attribute_id: Set(payload.attribute_id),
            option_id: Set(*option_id),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "attribute_values_set",
        Some("product_attribute_values"),
        Some(serde_json::json!({
            "product_id": product_id,
            "attribute_id": payload.attribute_id,
            "count": option_ids.len(),
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let values = AttributeValues::find()
        .filter(ValueCol::ProductId.eq(product_id))
        .order_by_asc(ValueCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(value_from_entity)
        .collect();

    let data = ProductDetail {
        product: product_from_entity(product),
        values,
    };
    Ok(ApiResponse::success(
        "Attribute values saved",
        data,
        Some(Meta::empty()),
    ))
}

/// Delete a product and everything that references it: tags, add-on match
/// overrides (either side), and bundle lines. Affected bundles get their
/// derived price fields recomputed in the same transaction so no stored
/// pricing goes stale.
pub async fn remove_product(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if Products::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let mut tx = state.pool.begin().await?;

    let affected: Vec<(Uuid,)> =
        sqlx::query_as("SELECT DISTINCT bundle_id FROM product_bundle_lines WHERE product_id = $1")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

    sqlx::query("DELETE FROM product_attribute_values WHERE product_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM product_addon_matches WHERE product_id = $1 OR addon_product_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM product_bundle_lines WHERE product_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    for (bundle_id,) in &affected {
        bundle_service::recompute_stored_pricing(&mut tx, *bundle_id).await?;
    }

    tx.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id, "bundles_repriced": affected.len() })),
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

/// Map of product type id to its default add-on flag.
pub(crate) async fn product_type_defaults(state: &AppState) -> AppResult<HashMap<Uuid, bool>> {
    let map = ProductTypes::find()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|t| (t.id, t.is_addon))
        .collect();
    Ok(map)
}

async fn check_product_refs(
    state: &AppState,
    category_id: Option<Uuid>,
    product_type_id: Option<Uuid>,
) -> AppResult<()> {
    if let Some(category_id) = category_id {
        if Categories::find_by_id(category_id)
            .one(&state.orm)
            .await?
            .is_none()
        {
            return Err(AppError::InvalidReference(format!(
                "category {category_id} does not exist"
            )));
        }
    }
    if let Some(product_type_id) = product_type_id {
        if ProductTypes::find_by_id(product_type_id)
            .one(&state.orm)
            .await?
            .is_none()
        {
            return Err(AppError::InvalidReference(format!(
                "product type {product_type_id} does not exist"
            )));
        }
    }
    Ok(())
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        title: model.title,
        description: model.description,
        price: model.price,
        category_id: model.category_id,
        product_type_id: model.product_type_id,
        is_addon: model.is_addon,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn value_from_entity(model: ValueModel) -> AttributeValue {
    AttributeValue {
        id: model.id,
        product_id: model.product_id,
        attribute_id: model.attribute_id,
        option_id: model.option_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
