use axum::Router;

use crate::state::AppState;

pub mod attributes;
pub mod audit;
pub mod bundles;
pub mod categories;
pub mod doc;
pub mod health;
pub mod matching;
pub mod params;
pub mod product_types;
pub mod products;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/product-types", product_types::router())
        .nest("/attributes", attributes::router())
        .nest("/products", products::router().merge(matching::router()))
        .nest("/bundles", bundles::router())
        .nest("/audit-logs", audit::router())
}
