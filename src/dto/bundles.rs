use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Bundle, BundleType};
use crate::pricing::{BundlePricing, DiscountType, SubscriptionDuration};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BundleLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBundleRequest {
    pub name: String,
    pub description: Option<String>,
    pub bundle_type: Option<BundleType>,
    pub lines: Vec<BundleLineRequest>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub subscription_duration: Option<SubscriptionDuration>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBundleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub lines: Option<Vec<BundleLineRequest>>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub subscription_duration: Option<SubscriptionDuration>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// A bundle line joined to the current catalog. `title`/`unit_price` are
/// `None` when the product no longer exists; such lines price at zero and
/// are reported through the response warnings.
#[derive(Debug, Serialize, ToSchema)]
pub struct BundleLineView {
    pub product_id: Uuid,
    pub quantity: i32,
    pub title: Option<String>,
    pub unit_price: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BundleWithLines {
    pub bundle: Bundle,
    pub lines: Vec<BundleLineView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BundleList {
    pub items: Vec<BundleWithLines>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PreviewPricingRequest {
    pub lines: Vec<BundleLineRequest>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewPricingResponse {
    pub pricing: BundlePricing,
}
