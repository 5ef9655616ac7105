use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::attributes::{
        AttributeList, CreateAttributeRequest, CreateOptionRequest, UpdateAttributeRequest,
        UpdateOptionRequest,
    },
    error::AppResult,
    models::{Attribute, AttributeOption},
    response::ApiResponse,
    services::attribute_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_attributes).post(create_attribute))
        .route("/{id}", put(update_attribute).delete(delete_attribute))
        .route("/{id}/options", post(create_option))
        .route(
            "/{id}/options/{option_id}",
            put(update_option).delete(delete_option),
        )
}

#[utoipa::path(
    get,
    path = "/api/attributes",
    responses(
        (status = 200, description = "List attributes with ordered options", body = ApiResponse<AttributeList>)
    ),
    tag = "Attributes"
)]
pub async fn list_attributes(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<AttributeList>>> {
    let resp = attribute_service::list_attributes(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/attributes",
    request_body = CreateAttributeRequest,
    responses(
        (status = 200, description = "Create attribute", body = ApiResponse<Attribute>)
    ),
    tag = "Attributes"
)]
pub async fn create_attribute(
    State(state): State<AppState>,
    Json(payload): Json<CreateAttributeRequest>,
) -> AppResult<Json<ApiResponse<Attribute>>> {
    let resp = attribute_service::create_attribute(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/attributes/{id}",
    params(
        ("id" = Uuid, Path, description = "Attribute ID")
    ),
    request_body = UpdateAttributeRequest,
    responses(
        (status = 200, description = "Update attribute", body = ApiResponse<Attribute>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Attributes"
)]
pub async fn update_attribute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAttributeRequest>,
) -> AppResult<Json<ApiResponse<Attribute>>> {
    let resp = attribute_service::update_attribute(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/attributes/{id}",
    params(
        ("id" = Uuid, Path, description = "Attribute ID")
    ),
    responses(
        (status = 200, description = "Delete attribute with its options and tags"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Attributes"
)]
pub async fn delete_attribute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = attribute_service::delete_attribute(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/attributes/{id}/options",
    params(
        ("id" = Uuid, Path, description = "Attribute ID")
    ),
    request_body = CreateOptionRequest,
    responses(
        (status = 200, description = "Create option", body = ApiResponse<AttributeOption>),
        (status = 400, description = "Global attribute option with a category"),
        (status = 422, description = "Category does not exist"),
    ),
    tag = "Attributes"
)]
pub async fn create_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateOptionRequest>,
) -> AppResult<Json<ApiResponse<AttributeOption>>> {
    let resp = attribute_service::create_option(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/attributes/{id}/options/{option_id}",
    params(
        ("id" = Uuid, Path, description = "Attribute ID"),
        ("option_id" = Uuid, Path, description = "Option ID"),
    ),
    request_body = UpdateOptionRequest,
    responses(
        (status = 200, description = "Update option", body = ApiResponse<AttributeOption>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Attributes"
)]
pub async fn update_option(
    State(state): State<AppState>,
    Path((id, option_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateOptionRequest>,
) -> AppResult<Json<ApiResponse<AttributeOption>>> {
    let resp = attribute_service::update_option(&state, id, option_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/attributes/{id}/options/{option_id}",
    params(
        ("id" = Uuid, Path, description = "Attribute ID"),
        ("option_id" = Uuid, Path, description = "Option ID"),
    ),
    responses(
        (status = 200, description = "Delete option and its tags"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Attributes"
)]
pub async fn delete_option(
    State(state): State<AppState>,
    Path((id, option_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = attribute_service::delete_option(&state, id, option_id).await?;
    Ok(Json(resp))
}
