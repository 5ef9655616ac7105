use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::catalog::{CreateProductTypeRequest, ProductTypeList, UpdateProductTypeRequest},
    error::AppResult,
    models::ProductType,
    response::ApiResponse,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_product_types).post(create_product_type))
        .route("/{id}", put(update_product_type).delete(delete_product_type))
}

#[utoipa::path(
    get,
    path = "/api/product-types",
    responses(
        (status = 200, description = "List product types", body = ApiResponse<ProductTypeList>)
    ),
    tag = "Product types"
)]
pub async fn list_product_types(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductTypeList>>> {
    let resp = catalog_service::list_product_types(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/product-types",
    request_body = CreateProductTypeRequest,
    responses(
        (status = 200, description = "Create product type", body = ApiResponse<ProductType>)
    ),
    tag = "Product types"
)]
pub async fn create_product_type(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductTypeRequest>,
) -> AppResult<Json<ApiResponse<ProductType>>> {
    let resp = catalog_service::create_product_type(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/product-types/{id}",
    params(
        ("id" = Uuid, Path, description = "Product type ID")
    ),
    request_body = UpdateProductTypeRequest,
    responses(
        (status = 200, description = "Update product type", body = ApiResponse<ProductType>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Product types"
)]
pub async fn update_product_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductTypeRequest>,
) -> AppResult<Json<ApiResponse<ProductType>>> {
    let resp = catalog_service::update_product_type(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/product-types/{id}",
    params(
        ("id" = Uuid, Path, description = "Product type ID")
    ),
    responses(
        (status = 200, description = "Delete product type; referencing products keep their override flag"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Product types"
)]
pub async fn delete_product_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = catalog_service::delete_product_type(&state, id).await?;
    Ok(Json(resp))
}
