use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::bundles::{
        BundleList, BundleWithLines, CreateBundleRequest, PreviewPricingRequest,
        PreviewPricingResponse, SetActiveRequest, UpdateBundleRequest,
    },
    error::AppResult,
    models::Bundle,
    response::ApiResponse,
    routes::params::BundleListQuery,
    services::bundle_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bundles).post(create_bundle))
        .route("/preview-pricing", post(preview_pricing))
        .route(
            "/{id}",
            get(get_bundle).put(update_bundle).delete(archive_bundle),
        )
        .route("/{id}/active", patch(set_active))
}

#[utoipa::path(
    get,
    path = "/api/bundles",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("bundle_type" = Option<String>, Query, description = "fixed or subscription"),
        ("active" = Option<bool>, Query, description = "Filter by active flag"),
        ("include_archived" = Option<bool>, Query, description = "Include archived bundles, default false"),
    ),
    responses(
        (status = 200, description = "List bundles with freshly recomputed pricing", body = ApiResponse<BundleList>)
    ),
    tag = "Bundles"
)]
pub async fn list_bundles(
    State(state): State<AppState>,
    Query(query): Query<BundleListQuery>,
) -> AppResult<Json<ApiResponse<BundleList>>> {
    let resp = bundle_service::list_bundles(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bundles/{id}",
    params(
        ("id" = Uuid, Path, description = "Bundle ID")
    ),
    responses(
        (status = 200, description = "Get bundle; lines referencing deleted products price at zero and are reported as warnings", body = ApiResponse<BundleWithLines>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Bundles"
)]
pub async fn get_bundle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BundleWithLines>>> {
    let resp = bundle_service::get_bundle(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bundles",
    request_body = CreateBundleRequest,
    responses(
        (status = 200, description = "Create bundle as draft; derived prices computed atomically with the lines", body = ApiResponse<BundleWithLines>),
        (status = 422, description = "A line references a product that does not exist"),
    ),
    tag = "Bundles"
)]
pub async fn create_bundle(
    State(state): State<AppState>,
    Json(payload): Json<CreateBundleRequest>,
) -> AppResult<Json<ApiResponse<BundleWithLines>>> {
    let resp = bundle_service::create_bundle(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/bundles/{id}",
    params(
        ("id" = Uuid, Path, description = "Bundle ID")
    ),
    request_body = UpdateBundleRequest,
    responses(
        (status = 200, description = "Update bundle; last write wins at save granularity", body = ApiResponse<BundleWithLines>),
        (status = 400, description = "Bundle is archived"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Bundles"
)]
pub async fn update_bundle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBundleRequest>,
) -> AppResult<Json<ApiResponse<BundleWithLines>>> {
    let resp = bundle_service::update_bundle(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/bundles/{id}/active",
    params(
        ("id" = Uuid, Path, description = "Bundle ID")
    ),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Toggle draft/active", body = ApiResponse<Bundle>),
        (status = 400, description = "Bundle is archived"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Bundles"
)]
pub async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> AppResult<Json<ApiResponse<Bundle>>> {
    let resp = bundle_service::set_active(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/bundles/{id}",
    params(
        ("id" = Uuid, Path, description = "Bundle ID")
    ),
    responses(
        (status = 200, description = "Archive bundle (soft delete, kept for history)", body = ApiResponse<Bundle>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Bundles"
)]
pub async fn archive_bundle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Bundle>>> {
    let resp = bundle_service::archive_bundle(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bundles/preview-pricing",
    request_body = PreviewPricingRequest,
    responses(
        (status = 200, description = "Price an ad-hoc line set without saving", body = ApiResponse<PreviewPricingResponse>)
    ),
    tag = "Bundles"
)]
pub async fn preview_pricing(
    State(state): State<AppState>,
    Json(payload): Json<PreviewPricingRequest>,
) -> AppResult<Json<ApiResponse<PreviewPricingResponse>>> {
    let resp = bundle_service::preview_pricing(&state, payload).await?;
    Ok(Json(resp))
}
