use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        attributes::{AttributeList, AttributeWithOptions},
        bundles::{
            BundleLineRequest, BundleLineView, BundleList, BundleWithLines,
            PreviewPricingResponse,
        },
        catalog::{CategoryList, ProductTypeList},
        matching::{SelectionResponse, SuggestionsResponse},
        products::{ProductDetail, ProductList},
    },
    matching::{AddonProduct, AttributeCandidates, OptionCandidates},
    models::{
        Attribute, AttributeOption, AttributeValue, AuditLog, Bundle, BundleType, Category,
        Product, ProductType,
    },
    pricing::{BundlePricing, DiscountType, SubscriptionDuration},
    response::{ApiResponse, Meta},
    routes::{
        attributes as attribute_routes, audit as audit_routes, bundles as bundle_routes,
        categories as category_routes, health, matching as matching_routes, params,
        product_types as product_type_routes, products as product_routes,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        category_routes::list_categories,
        category_routes::create_category,
        category_routes::update_category,
        category_routes::delete_category,
        product_type_routes::list_product_types,
        product_type_routes::create_product_type,
        product_type_routes::update_product_type,
        product_type_routes::delete_product_type,
        attribute_routes::list_attributes,
        attribute_routes::create_attribute,
        attribute_routes::update_attribute,
        attribute_routes::delete_attribute,
        attribute_routes::create_option,
        attribute_routes::update_option,
        attribute_routes::delete_option,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        product_routes::set_attribute_values,
        matching_routes::get_suggestions,
        matching_routes::get_selection,
        matching_routes::save_selection,
        bundle_routes::list_bundles,
        bundle_routes::get_bundle,
        bundle_routes::create_bundle,
        bundle_routes::update_bundle,
        bundle_routes::set_active,
        bundle_routes::archive_bundle,
        bundle_routes::preview_pricing,
        audit_routes::list_audit_logs
    ),
    components(
        schemas(
            Category,
            ProductType,
            Attribute,
            AttributeOption,
            Product,
            AttributeValue,
            Bundle,
            BundleType,
            DiscountType,
            SubscriptionDuration,
            BundlePricing,
            AddonProduct,
            OptionCandidates,
            AttributeCandidates,
            CategoryList,
            ProductTypeList,
            AttributeList,
            AttributeWithOptions,
            ProductList,
            ProductDetail,
            SuggestionsResponse,
            SelectionResponse,
            BundleLineRequest,
            BundleLineView,
            BundleWithLines,
            BundleList,
            PreviewPricingResponse,
            AuditLog,
            audit_routes::AuditLogList,
            params::Pagination,
            params::ProductQuery,
            params::BundleListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<SuggestionsResponse>,
            ApiResponse<SelectionResponse>,
            ApiResponse<BundleWithLines>,
            ApiResponse<BundleList>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Categories", description = "Product category endpoints"),
        (name = "Product types", description = "Product type endpoints"),
        (name = "Attributes", description = "Attribute and option endpoints"),
        (name = "Products", description = "Product and tagging endpoints"),
        (name = "Matching", description = "Add-on suggestion and override endpoints"),
        (name = "Bundles", description = "Bundle and pricing endpoints"),
        (name = "Audit", description = "Mutation history"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
