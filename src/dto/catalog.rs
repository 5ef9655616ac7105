use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Category, ProductType};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub handle: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub handle: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductTypeRequest {
    pub name: String,
    pub is_addon: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductTypeRequest {
    pub name: Option<String>,
    pub is_addon: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductTypeList {
    pub items: Vec<ProductType>,
}
