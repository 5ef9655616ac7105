use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "product_attributes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    pub is_category_linked: bool,
    pub is_filterable: bool,
    pub display_order: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attribute_options::Entity")]
    AttributeOptions,
    #[sea_orm(has_many = "super::attribute_values::Entity")]
    AttributeValues,
}

impl Related<super::attribute_options::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttributeOptions.def()
    }
}

impl Related<super::attribute_values::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttributeValues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
