use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::matching::AttributeCandidates;

/// Derived candidates, grouped per attribute and option. Advisory only: the
/// groups are never applied automatically and are distinct from the saved
/// selection.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionsResponse {
    pub product_id: Uuid,
    pub category_id: Option<Uuid>,
    pub groups: Vec<AttributeCandidates>,
}

/// The persisted, authoritative selection. Empty means "no add-ons", not
/// "fall back to suggestions".
#[derive(Debug, Serialize, ToSchema)]
pub struct SelectionResponse {
    pub product_id: Uuid,
    pub addon_product_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveSelectionRequest {
    pub addon_product_ids: Vec<Uuid>,
}
