use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::matching::{SaveSelectionRequest, SelectionResponse, SuggestionsResponse},
    error::AppResult,
    response::ApiResponse,
    services::match_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/addon-suggestions", get(get_suggestions))
        .route(
            "/{id}/addon-matches",
            get(get_selection).put(save_selection),
        )
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/addon-suggestions",
    params(
        ("id" = Uuid, Path, description = "Base product ID")
    ),
    responses(
        (status = 200, description = "Derived add-on candidates grouped by attribute and option; empty with a warning when the product has no category", body = ApiResponse<SuggestionsResponse>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Matching"
)]
pub async fn get_suggestions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SuggestionsResponse>>> {
    let resp = match_service::get_suggestions(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/addon-matches",
    params(
        ("id" = Uuid, Path, description = "Base product ID")
    ),
    responses(
        (status = 200, description = "Saved add-on selection, empty if never saved", body = ApiResponse<SelectionResponse>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Matching"
)]
pub async fn get_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SelectionResponse>>> {
    let resp = match_service::get_selection(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/addon-matches",
    params(
        ("id" = Uuid, Path, description = "Base product ID")
    ),
    request_body = SaveSelectionRequest,
    responses(
        (status = 200, description = "Replace the saved selection wholesale; last write wins", body = ApiResponse<SelectionResponse>),
        (status = 404, description = "Product not found"),
        (status = 422, description = "An id is not an existing add-on product"),
    ),
    tag = "Matching"
)]
pub async fn save_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveSelectionRequest>,
) -> AppResult<Json<ApiResponse<SelectionResponse>>> {
    let resp = match_service::save_selection(&state, id, payload).await?;
    Ok(Json(resp))
}
