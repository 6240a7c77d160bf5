use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i32>,
    pub current_products: Option<String>,
    pub past_products: Option<String>,
    pub date_registered: DateTimeWithTimeZone,
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

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_products::Relation::Products.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_products::Relation::Users.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
