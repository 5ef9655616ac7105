use sea_orm::entity::prelude::*;

/// One constituent product of a bundle. `product_id` is deliberately not a
/// foreign key: a historical line may outlive its product and is then
/// surfaced as an unknown-product warning at read time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "product_bundle_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub bundle_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bundles::Entity",
        from = "Column::BundleId",
        to = "super::bundles::Column::Id"
    )]
    Bundle,
}

impl Related<super::bundles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bundle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
