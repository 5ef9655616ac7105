use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::bundles::{
        BundleLineRequest, BundleLineView, BundleList, BundleWithLines, CreateBundleRequest,
        PreviewPricingRequest, PreviewPricingResponse, SetActiveRequest, UpdateBundleRequest,
    },
    entity::bundle_lines::{ActiveModel as LineActive, Column as LineCol, Entity as BundleLines},
    entity::bundles::{
        ActiveModel as BundleActive, Column as BundleCol, Entity as Bundles, Model as BundleModel,
    },
    entity::products::{Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
    models::{Bundle, BundleType},
    pricing::{BundlePricing, DiscountType, PriceLine, SubscriptionDuration, compute_pricing},
    response::{ApiResponse, Meta},
    routes::params::BundleListQuery,
    state::AppState,
    validation::{handle_from_name, validate_display_name},
};

#[derive(Debug, FromRow)]
pub(crate) struct BundleLineRow {
    pub product_id: Uuid,
    pub quantity: i32,
    pub title: Option<String>,
    pub price: Option<i64>,
}

pub async fn list_bundles(
    state: &AppState,
    query: BundleListQuery,
) -> AppResult<ApiResponse<BundleList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if !query.include_archived.unwrap_or(false) {
        condition = condition.add(BundleCol::ArchivedAt.is_null());
    }
    if let Some(active) = query.active {
        condition = condition.add(BundleCol::IsActive.eq(active));
    }
    if let Some(bundle_type) = query.bundle_type.as_ref().filter(|s| !s.is_empty()) {
        let bundle_type = BundleType::parse(bundle_type)
            .ok_or_else(|| AppError::BadRequest("unknown bundle type".into()))?;
        condition = condition.add(BundleCol::BundleType.eq(bundle_type.as_str()));
    }

    let finder = Bundles::find()
        .filter(condition)
        .order_by_desc(BundleCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let bundles = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut warnings = Vec::new();
    let mut items = Vec::new();
    for bundle in bundles {
        let rows = fetch_line_rows(&state.pool, bundle.id).await?;
        items.push(assemble(bundle, &rows, &mut warnings));
    }

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Bundles", BundleList { items }, Some(meta)).with_warnings(warnings))
}

pub async fn get_bundle(state: &AppState, id: Uuid) -> AppResult<ApiResponse<BundleWithLines>> {
    let bundle = Bundles::find_by_id(id).one(&state.orm).await?;
    let bundle = match bundle {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    let rows = fetch_line_rows(&state.pool, bundle.id).await?;
    let mut warnings = Vec::new();
    let data = assemble(bundle, &rows, &mut warnings);

    Ok(ApiResponse::success("Bundle", data, Some(Meta::empty())).with_warnings(warnings))
}

pub async fn create_bundle(
    state: &AppState,
    payload: CreateBundleRequest,
) -> AppResult<ApiResponse<BundleWithLines>> {
    validate_display_name(&payload.name, "Bundle").map_err(AppError::BadRequest)?;

    let bundle_type = payload.bundle_type.unwrap_or(BundleType::Fixed);
    if payload.subscription_duration.is_some() && bundle_type == BundleType::Fixed {
        return Err(AppError::BadRequest(
            "subscription_duration requires a subscription bundle".into(),
        ));
    }

    let (price_lines, views) = validate_lines(state, &payload.lines).await?;
    let (discount_type, discount_value) = resolve_discount(
        payload.discount_type,
        payload.discount_value,
        payload.subscription_duration,
        None,
    );
    let pricing = compute_pricing(&price_lines, discount_type, discount_value);

    let txn = state.orm.begin().await?;
    let bundle = BundleActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        handle: Set(handle_from_name(&payload.name)),
        description: Set(payload.description),
        bundle_type: Set(bundle_type.as_str().to_string()),
        discount_type: Set(discount_type.as_str().to_string()),
        discount_value: Set(discount_value),
        original_price: Set(pricing.original_price),
        savings: Set(pricing.savings),
        final_price: Set(pricing.final_price),
        subscription_duration: Set(payload
            .subscription_duration
            .map(|d| d.as_str().to_string())),
        is_active: Set(false),
        is_featured: Set(payload.is_featured.unwrap_or(false)),
        archived_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for line in &payload.lines {
        LineActive {
            id: Set(Uuid::new_v4()),
            bundle_id: Set(bundle.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "bundle_create",
        Some("product_bundles"),
        Some(serde_json::json!({ "bundle_id": bundle.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = BundleWithLines {
        bundle: bundle_from_entity(bundle),
        lines: views,
    };
    Ok(ApiResponse::success(
        "Bundle created",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn update_bundle(
    state: &AppState,
    id: Uuid,
    payload: UpdateBundleRequest,
) -> AppResult<ApiResponse<BundleWithLines>> {
    let existing = Bundles::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    if existing.archived_at.is_some() {
        return Err(AppError::BadRequest("Bundle is archived".into()));
    }

    if payload.subscription_duration.is_some() && existing.bundle_type == BundleType::Fixed.as_str()
    {
        return Err(AppError::BadRequest(
            "subscription_duration requires a subscription bundle".into(),
        ));
    }

    let (discount_type, discount_value) = resolve_discount(
        payload.discount_type,
        payload.discount_value,
        payload.subscription_duration,
        Some(&existing),
    );

    let mut warnings = Vec::new();
    let (price_lines, views) = match &payload.lines {
        Some(lines) => validate_lines(state, lines).await?,
        None => {
            let rows = fetch_line_rows(&state.pool, id).await?;
            line_rows_to_views(&existing.name, &rows, &mut warnings)
        }
    };
    let pricing = compute_pricing(&price_lines, discount_type, discount_value);

    let txn = state.orm.begin().await?;
    if let Some(lines) = &payload.lines {
        BundleLines::delete_many()
            .filter(LineCol::BundleId.eq(id))
            .exec(&txn)
            .await?;
        for line in lines {
            LineActive {
                id: Set(Uuid::new_v4()),
                bundle_id: Set(id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
        }
    }

    let mut active: BundleActive = existing.into();
    if let Some(name) = payload.name {
        validate_display_name(&name, "Bundle").map_err(AppError::BadRequest)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    if let Some(duration) = payload.subscription_duration {
        active.subscription_duration = Set(Some(duration.as_str().to_string()));
    }
    active.discount_type = Set(discount_type.as_str().to_string());
    active.discount_value = Set(discount_value);
    active.original_price = Set(pricing.original_price);
    active.savings = Set(pricing.savings);
    active.final_price = Set(pricing.final_price);
    active.updated_at = Set(Utc::now().into());
    let bundle = active.update(&txn).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "bundle_update",
        Some("product_bundles"),
        Some(serde_json::json!({ "bundle_id": bundle.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = BundleWithLines {
        bundle: bundle_from_entity(bundle),
        lines: views,
    };
    Ok(ApiResponse::success("Updated", data, Some(Meta::empty())).with_warnings(warnings))
}

/// Draft/active toggle. Archived bundles stay read-only history.
pub async fn set_active(
    state: &AppState,
    id: Uuid,
    payload: SetActiveRequest,
) -> AppResult<ApiResponse<Bundle>> {
    let existing = Bundles::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    if existing.archived_at.is_some() {
        return Err(AppError::BadRequest("Bundle is archived".into()));
    }

    let mut active: BundleActive = existing.into();
    active.is_active = Set(payload.is_active);
    active.updated_at = Set(Utc::now().into());
    let bundle = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "bundle_set_active",
        Some("product_bundles"),
        Some(serde_json::json!({ "bundle_id": bundle.id, "is_active": bundle.is_active })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Bundle updated",
        bundle_from_entity(bundle),
        Some(Meta::empty()),
    ))
}

/// Soft delete: the bundle leaves the storefront but is kept for history.
pub async fn archive_bundle(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Bundle>> {
    let existing = Bundles::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    let mut active: BundleActive = existing.into();
    active.archived_at = Set(Some(Utc::now().into()));
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    let bundle = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "bundle_archive",
        Some("product_bundles"),
        Some(serde_json::json!({ "bundle_id": bundle.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Bundle archived",
        bundle_from_entity(bundle),
        Some(Meta::empty()),
    ))
}

/// Price an ad-hoc line set without persisting anything. Unknown products
/// degrade to zero-priced lines and a warning instead of an error.
pub async fn preview_pricing(
    state: &AppState,
    payload: PreviewPricingRequest,
) -> AppResult<ApiResponse<PreviewPricingResponse>> {
    for line in &payload.lines {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".into(),
            ));
        }
    }

    let ids: Vec<Uuid> = payload.lines.iter().map(|l| l.product_id).collect();
    let prices: HashMap<Uuid, i64> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, p.price))
        .collect();

    let mut warnings = Vec::new();
    let price_lines: Vec<PriceLine> = payload
        .lines
        .iter()
        .map(|line| {
            let unit_price = prices.get(&line.product_id).copied();
            if unit_price.is_none() {
                warnings.push(format!(
                    "line references unknown product {}",
                    line.product_id
                ));
            }
            PriceLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price,
            }
        })
        .collect();

    let pricing = compute_pricing(&price_lines, payload.discount_type, payload.discount_value);
    let data = PreviewPricingResponse { pricing };
    Ok(ApiResponse::success("Pricing", data, Some(Meta::empty())).with_warnings(warnings))
}

/// Refresh a bundle's stored derived price fields from its current lines
/// and discount rule. Runs inside the caller's transaction.
pub(crate) async fn recompute_stored_pricing(
    conn: &mut sqlx::PgConnection,
    bundle_id: Uuid,
) -> AppResult<()> {
    let rule: Option<(String, i64)> =
        sqlx::query_as("SELECT discount_type, discount_value FROM product_bundles WHERE id = $1")
            .bind(bundle_id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some((discount_type, discount_value)) = rule else {
        return Ok(());
    };
    let discount_type = DiscountType::parse(&discount_type).unwrap_or(DiscountType::Percentage);

    let rows = fetch_line_rows(&mut *conn, bundle_id).await?;
    let lines: Vec<PriceLine> = rows
        .iter()
        .map(|row| PriceLine {
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.price,
        })
        .collect();
    let pricing = compute_pricing(&lines, discount_type, discount_value);

    sqlx::query(
        r#"
        UPDATE product_bundles
        SET original_price = $2, savings = $3, final_price = $4, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(bundle_id)
    .bind(pricing.original_price)
    .bind(pricing.savings)
    .bind(pricing.final_price)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub(crate) async fn fetch_line_rows<'a, E>(
    executor: E,
    bundle_id: Uuid,
) -> AppResult<Vec<BundleLineRow>>
where
    E: sqlx::PgExecutor<'a>,
{
    let rows = sqlx::query_as::<_, BundleLineRow>(
        r#"
        SELECT l.product_id, l.quantity, p.title, p.price
        FROM product_bundle_lines l
        LEFT JOIN products p ON p.id = l.product_id
        WHERE l.bundle_id = $1
        ORDER BY l.created_at, l.id
        "#,
    )
    .bind(bundle_id)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

async fn validate_lines(
    state: &AppState,
    lines: &[BundleLineRequest],
) -> AppResult<(Vec<PriceLine>, Vec<BundleLineView>)> {
    let mut seen = HashSet::new();
    for line in lines {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".into(),
            ));
        }
        if !seen.insert(line.product_id) {
            return Err(AppError::BadRequest(format!(
                "duplicate product {} in bundle",
                line.product_id
            )));
        }
    }

    let ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let products: HashMap<Uuid, (String, i64)> = Products::find()
        .filter(ProdCol::Id.is_in(ids.clone()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, (p.title, p.price)))
        .collect();

    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !products.contains_key(id))
        .map(|id| id.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::InvalidReference(format!(
            "products do not exist: {}",
            missing.join(", ")
        )));
    }

    let price_lines = lines
        .iter()
        .map(|line| PriceLine {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: products.get(&line.product_id).map(|(_, price)| *price),
        })
        .collect();
    let views = lines
        .iter()
        .map(|line| BundleLineView {
            product_id: line.product_id,
            quantity: line.quantity,
            title: products.get(&line.product_id).map(|(title, _)| title.clone()),
            unit_price: products.get(&line.product_id).map(|(_, price)| *price),
        })
        .collect();

    Ok((price_lines, views))
}

fn line_rows_to_views(
    bundle_label: &str,
    rows: &[BundleLineRow],
    warnings: &mut Vec<String>,
) -> (Vec<PriceLine>, Vec<BundleLineView>) {
    let mut price_lines = Vec::with_capacity(rows.len());
    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        if row.title.is_none() {
            warnings.push(format!(
                "bundle {bundle_label}: line references unknown product {}",
                row.product_id
            ));
        }
        price_lines.push(PriceLine {
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.price,
        });
        views.push(BundleLineView {
            product_id: row.product_id,
            quantity: row.quantity,
            title: row.title.clone(),
            unit_price: row.price,
        });
    }
    (price_lines, views)
}

/// Join a bundle to its current lines, recomputing the derived price fields
/// instead of trusting the stored copies.
fn assemble(
    model: BundleModel,
    rows: &[BundleLineRow],
    warnings: &mut Vec<String>,
) -> BundleWithLines {
    let (price_lines, views) = line_rows_to_views(&model.name, rows, warnings);
    let mut bundle = bundle_from_entity(model);
    let pricing: BundlePricing =
        compute_pricing(&price_lines, bundle.discount_type, bundle.discount_value);
    bundle.original_price = pricing.original_price;
    bundle.savings = pricing.savings;
    bundle.final_price = pricing.final_price;

    BundleWithLines {
        bundle,
        lines: views,
    }
}

/// Discount rule for a save. Picking a duration the bundle did not already
/// have, with no explicit value, applies the tier default; an explicit value
/// always sticks.
fn resolve_discount(
    requested_type: Option<DiscountType>,
    requested_value: Option<i64>,
    requested_duration: Option<SubscriptionDuration>,
    existing: Option<&BundleModel>,
) -> (DiscountType, i64) {
    let current_type = existing.and_then(|b| DiscountType::parse(&b.discount_type));
    let current_value = existing.map(|b| b.discount_value);
    let current_duration = existing.and_then(|b| {
        b.subscription_duration
            .as_deref()
            .and_then(SubscriptionDuration::parse)
    });

    if let Some(duration) = requested_duration {
        if requested_value.is_none() && Some(duration) != current_duration {
            return (
                DiscountType::Percentage,
                duration.default_discount_percent(),
            );
        }
    }

    let discount_type = requested_type
        .or(current_type)
        .unwrap_or(DiscountType::Percentage);
    let value = requested_value.or(current_value).unwrap_or(0);
    let value = match discount_type {
        DiscountType::Percentage => value.clamp(0, 100),
        DiscountType::FixedAmount => value.max(0),
    };
    (discount_type, value)
}

fn bundle_from_entity(model: BundleModel) -> Bundle {
    let bundle_type = BundleType::parse(&model.bundle_type).unwrap_or_else(|| {
        tracing::warn!(bundle_id = %model.id, value = %model.bundle_type, "unknown bundle type");
        BundleType::Fixed
    });
    let discount_type = DiscountType::parse(&model.discount_type).unwrap_or_else(|| {
        tracing::warn!(bundle_id = %model.id, value = %model.discount_type, "unknown discount type");
        DiscountType::Percentage
    });
    let subscription_duration = model
        .subscription_duration
        .as_deref()
        .and_then(SubscriptionDuration::parse);

    Bundle {
        id: model.id,
        name: model.name,
        handle: model.handle,
        description: model.description,
        bundle_type,
        discount_type,
        discount_value: model.discount_value,
        original_price: model.original_price,
        savings: model.savings,
        final_price: model.final_price,
        subscription_duration,
        is_active: model.is_active,
        is_featured: model.is_featured,
        archived_at: model.archived_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
