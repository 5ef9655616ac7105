use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pricing::{DiscountType, SubscriptionDuration};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductType {
    pub id: Uuid,
    pub name: String,
    pub is_addon: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Attribute {
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    pub is_category_linked: bool,
    pub is_filterable: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttributeOption {
    pub id: Uuid,
    pub attribute_id: Uuid,
    pub name: String,
    pub handle: String,
    pub category_id: Option<Uuid>,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Product as the catalog surface sees it. `is_addon` is the product-level
/// override; the effective add-on flag falls back to the product type's
/// default when it is unset.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub category_id: Option<Uuid>,
    pub product_type_id: Option<Uuid>,
    pub is_addon: Option<bool>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttributeValue {
    pub id: Uuid,
    pub product_id: Uuid,
    pub attribute_id: Uuid,
    pub option_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditLog {
    pub id: Uuid,
    pub action: String,
    pub resource: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BundleType {
    Fixed,
    Subscription,
}

impl BundleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BundleType::Fixed => "fixed",
            BundleType::Subscription => "subscription",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(BundleType::Fixed),
            "subscription" => Some(BundleType::Subscription),
            _ => None,
        }
    }
}

/// Bundle record. The three derived price fields always mirror the pricing
/// engine's output for the current lines and discount rule; reads recompute
/// them rather than trusting the stored copies.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Bundle {
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    pub description: Option<String>,
    pub bundle_type: BundleType,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub original_price: i64,
    pub savings: i64,
    pub final_price: i64,
    pub subscription_duration: Option<SubscriptionDuration>,
    pub is_active: bool,
    pub is_featured: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
