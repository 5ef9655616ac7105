use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{AttributeValue, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub category_id: Option<Uuid>,
    pub product_type_id: Option<Uuid>,
    pub is_addon: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category_id: Option<Uuid>,
    pub product_type_id: Option<Uuid>,
    pub is_addon: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub values: Vec<AttributeValue>,
}

/// Wholesale replacement of a product's option set for one attribute.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetAttributeValuesRequest {
    pub attribute_id: Uuid,
    pub option_ids: Vec<Uuid>,
}
