use std::collections::HashSet;

use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::matching::{SaveSelectionRequest, SelectionResponse, SuggestionsResponse},
    entity::addon_matches::{
        ActiveModel as MatchActive, Column as MatchCol, Entity as AddonMatches,
    },
    entity::attribute_options::{Column as OptionCol, Entity as AttributeOptions},
    entity::attribute_values::{Column as ValueCol, Entity as AttributeValues},
    entity::attributes::{Column as AttributeCol, Entity as Attributes},
    entity::products::{Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    matching::{self, AddonProduct, AttributeKind, AttributeView, OptionTag, OptionView},
    response::{ApiResponse, Meta},
    services::product_service::product_type_defaults,
    state::AppState,
};

/// Derive the suggested add-on set for a base product.
///
/// Suggestions are advisory: they are never persisted and never merged into
/// the saved selection. A product without a category yields an empty result
/// with a warning rather than an error, so the operator UI can still render.
pub async fn get_suggestions(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<SuggestionsResponse>> {
    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let Some(category_id) = product.category_id else {
        let data = SuggestionsResponse {
            product_id,
            category_id: None,
            groups: Vec::new(),
        };
        return Ok(ApiResponse::success("Suggestions", data, Some(Meta::empty()))
            .with_warnings(vec![
                "product has no category; add-on candidates cannot be derived".into(),
            ]));
    };

    let attributes = Attributes::find()
        .filter(AttributeCol::IsCategoryLinked.eq(true))
        .order_by_asc(AttributeCol::DisplayOrder)
        .order_by_asc(AttributeCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let options = AttributeOptions::find()
        .filter(OptionCol::AttributeId.is_in(attributes.iter().map(|a| a.id).collect::<Vec<_>>()))
        .order_by_asc(OptionCol::DisplayOrder)
        .order_by_asc(OptionCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let addons = addon_products(state, Some(product_id)).await?;
    let addon_views: Vec<AddonProduct> = addons
        .iter()
        .map(|p| AddonProduct {
            id: p.id,
            title: p.title.clone(),
        })
        .collect();

    let tags = AttributeValues::find()
        .filter(ValueCol::ProductId.is_in(addons.iter().map(|p| p.id).collect::<Vec<_>>()))
        .order_by_asc(ValueCol::CreatedAt)
        .order_by_asc(ValueCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|v| OptionTag {
            product_id: v.product_id,
            option_id: v.option_id,
        })
        .collect::<Vec<_>>();

    let attribute_views: Vec<AttributeView> = attributes
        .into_iter()
        .map(|attribute| {
            let kind = AttributeKind::category_linked(
                options
                    .iter()
                    .filter(|o| o.attribute_id == attribute.id)
                    .map(|o| {
                        (
                            o.category_id,
                            OptionView {
                                id: o.id,
                                name: o.name.clone(),
                            },
                        )
                    }),
            );
            AttributeView {
                id: attribute.id,
                name: attribute.name,
                kind,
            }
        })
        .collect();

    let groups =
        matching::resolve_addon_candidates(category_id, &attribute_views, &addon_views, &tags);

    let data = SuggestionsResponse {
        product_id,
        category_id: Some(category_id),
        groups,
    };
    Ok(ApiResponse::success("Suggestions", data, Some(Meta::empty())))
}

/// The persisted selection for a base product; empty if none was ever saved.
pub async fn get_selection(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<SelectionResponse>> {
    if Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }

    let addon_product_ids = AddonMatches::find()
        .filter(MatchCol::ProductId.eq(product_id))
        .order_by_asc(MatchCol::DisplayOrder)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|m| m.addon_product_id)
        .collect();

    let data = SelectionResponse {
        product_id,
        addon_product_ids,
    };
    Ok(ApiResponse::success("Selection", data, Some(Meta::empty())))
}

/// Replace the saved add-on selection wholesale. Every id must refer to an
/// existing product whose effective add-on flag is true; any bad id rejects
/// the whole request. Saving an empty list clears the selection.
pub async fn save_selection(
    state: &AppState,
    product_id: Uuid,
    payload: SaveSelectionRequest,
) -> AppResult<ApiResponse<SelectionResponse>> {
    if Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }

    let mut seen = HashSet::new();
    let addon_ids: Vec<Uuid> = payload
        .addon_product_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();

    let valid = valid_addon_ids(state, &addon_ids).await?;
    let invalid: Vec<String> = addon_ids
        .iter()
        .filter(|id| !valid.contains(id))
        .map(|id| id.to_string())
        .collect();
    if !invalid.is_empty() {
        return Err(AppError::InvalidReference(format!(
            "not existing add-on products: {}",
            invalid.join(", ")
        )));
    }

    let txn = state.orm.begin().await?;
    AddonMatches::delete_many()
        .filter(MatchCol::ProductId.eq(product_id))
        .exec(&txn)
        .await?;
    for (index, addon_id) in addon_ids.iter().enumerate() {
        MatchActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            addon_product_id: Set(*addon_id),
            display_order: Set(index as i32),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "addon_matches_save",
        Some("product_addon_matches"),
        Some(serde_json::json!({ "product_id": product_id, "count": addon_ids.len() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = SelectionResponse {
        product_id,
        addon_product_ids: addon_ids,
    };
    Ok(ApiResponse::success(
        "Selection saved",
        data,
        Some(Meta::empty()),
    ))
}

/// All products whose effective add-on flag is true, in creation order,
/// optionally excluding the base product itself.
async fn addon_products(
    state: &AppState,
    exclude: Option<Uuid>,
) -> AppResult<Vec<ProductModel>> {
    let type_defaults = product_type_defaults(state).await?;
    let products = Products::find()
        .order_by_asc(crate::entity::products::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter(|p| Some(p.id) != exclude)
        .filter(|p| {
            let type_default = p.product_type_id.and_then(|t| type_defaults.get(&t).copied());
            p.effective_is_addon(type_default)
        })
        .collect();
    Ok(products)
}

async fn valid_addon_ids(state: &AppState, ids: &[Uuid]) -> AppResult<HashSet<Uuid>> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    let type_defaults = product_type_defaults(state).await?;
    let valid = Products::find()
        .filter(crate::entity::products::Column::Id.is_in(ids.to_vec()))
        .all(&state.orm)
        .await?
        .into_iter()
        .filter(|p| {
            let type_default = p.product_type_id.and_then(|t| type_defaults.get(&t).copied());
            p.effective_is_addon(type_default)
        })
        .map(|p| p.id)
        .collect();
    Ok(valid)
}
