use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Attribute, AttributeOption};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAttributeRequest {
    pub name: String,
    pub handle: Option<String>,
    pub is_category_linked: Option<bool>,
    pub is_filterable: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAttributeRequest {
    pub name: Option<String>,
    pub is_filterable: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOptionRequest {
    pub name: String,
    pub handle: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOptionRequest {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttributeWithOptions {
    pub attribute: Attribute,
    pub options: Vec<AttributeOption>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttributeList {
    pub items: Vec<AttributeWithOptions>,
}
