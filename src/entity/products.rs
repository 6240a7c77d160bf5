use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub weight: String,
    pub quantity: String,
    pub date_purchased: Date,
    pub image_link: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_products::Entity")]
    UserProducts,
}

impl Related<super::user_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserProducts.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_products::Relation::Users.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_products::Relation::Products.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
