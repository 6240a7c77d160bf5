use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, Unchanged,
};

use crate::{
    dto::users::UserInput,
    entity::{
        products::{self, Entity as Products, Model as ProductModel},
        user_products::{self, Entity as UserProducts},
        users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    },
    error::{StoreError, StoreResult},
    models::User,
    services::product_service::find_product,
};

pub async fn list_users<C: ConnectionTrait>(db: &C) -> StoreResult<Vec<UserModel>> {
    let users = Users::find()
        .order_by_desc(Column::LastName)
        .all(db)
        .await?;
    Ok(users)
}

pub async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> StoreResult<UserModel> {
    Users::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)
}

pub async fn insert_user<C: ConnectionTrait>(db: &C, input: UserInput) -> StoreResult<UserModel> {
    let active = ActiveModel {
        id: NotSet,
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        age: Set(Some(input.age)),
        current_products: Set(input.current_products),
        past_products: Set(input.past_products),
        date_registered: Set(Utc::now().fixed_offset()),
    };
    let user = active.insert(db).await?;
    tracing::debug!(user_id = user.id, "user inserted");
    Ok(user)
}

/// Overwrites every mutable column; the registration timestamp is left alone.
pub async fn update_user<C: ConnectionTrait>(
    db: &C,
    id: i32,
    input: UserInput,
) -> StoreResult<UserModel> {
    let active = ActiveModel {
        id: Unchanged(id),
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        age: Set(Some(input.age)),
        current_products: Set(input.current_products),
        past_products: Set(input.past_products),
        date_registered: NotSet,
    };
    let user = active.update(db).await?;
    Ok(user)
}

/// Removes the user and every association row pointing at it.
pub async fn delete_user<C: ConnectionTrait>(db: &C, id: i32) -> StoreResult<()> {
    UserProducts::delete_many()
        .filter(user_products::Column::UserId.eq(id))
        .exec(db)
        .await?;

    let result = Users::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

/// Associates a product with a user. Linking an already linked pair is a no-op.
pub async fn link_product<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    product_id: i32,
) -> StoreResult<()> {
    find_user(db, user_id).await?;
    find_product(db, product_id).await?;

    let existing = UserProducts::find_by_id((user_id, product_id)).one(db).await?;
    if existing.is_none() {
        user_products::ActiveModel {
            user_id: Set(user_id),
            product_id: Set(product_id),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

pub async fn products_of_user<C: ConnectionTrait>(
    db: &C,
    user: &UserModel,
) -> StoreResult<Vec<ProductModel>> {
    let products = user
        .find_related(Products)
        .order_by_asc(products::Column::Name)
        .all(db)
        .await?;
    Ok(products)
}

pub fn format_user(model: UserModel) -> User {
    User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        age: model.age,
        current_products: model.current_products,
        past_products: model.past_products,
        date_registered: model.date_registered.with_timezone(&Utc),
    }
}
