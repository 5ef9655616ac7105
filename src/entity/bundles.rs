use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "product_bundles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    pub description: Option<String>,
    pub bundle_type: String,
    pub discount_type: String,
    pub discount_value: i64,
    pub original_price: i64,
    pub savings: i64,
    pub final_price: i64,
    pub subscription_duration: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub archived_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bundle_lines::Entity")]
    BundleLines,
}

impl Related<super::bundle_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BundleLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
