use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set, Unchanged,
};

use crate::{
    dto::products::ProductInput,
    entity::{
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        user_products::{self, Entity as UserProducts},
    },
    error::{StoreError, StoreResult},
    models::Product,
};

pub async fn list_products<C: ConnectionTrait>(db: &C) -> StoreResult<Vec<ProductModel>> {
    let products = Products::find()
        .order_by_desc(Column::Name)
        .all(db)
        .await?;
    Ok(products)
}

pub async fn find_product<C: ConnectionTrait>(db: &C, id: i32) -> StoreResult<ProductModel> {
    Products::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)
}

pub async fn insert_product<C: ConnectionTrait>(
    db: &C,
    input: ProductInput,
) -> StoreResult<ProductModel> {
    let active = ActiveModel {
        id: NotSet,
        name: Set(input.name),
        description: Set(input.description),
        weight: Set(input.weight),
        quantity: Set(input.quantity),
        date_purchased: Set(input.date_purchased),
        image_link: Set(input.image_link),
    };
    let product = active.insert(db).await?;
    tracing::debug!(product_id = product.id, "product inserted");
    Ok(product)
}

/// Overwrites every mutable column of an existing product.
pub async fn update_product<C: ConnectionTrait>(
    db: &C,
    id: i32,
    input: ProductInput,
) -> StoreResult<ProductModel> {
    let active = ActiveModel {
        id: Unchanged(id),
        name: Set(input.name),
        description: Set(input.description),
        weight: Set(input.weight),
        quantity: Set(input.quantity),
        date_purchased: Set(input.date_purchased),
        image_link: Set(input.image_link),
    };
    let product = active.update(db).await?;
    Ok(product)
}

/// Removes the product and every association row pointing at it.
pub async fn delete_product<C: ConnectionTrait>(db: &C, id: i32) -> StoreResult<()> {
    UserProducts::delete_many()
        .filter(user_products::Column::ProductId.eq(id))
        .exec(db)
        .await?;

    let result = Products::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

pub fn format_product(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        weight: model.weight,
        quantity: model.quantity,
        date_purchased: model.date_purchased,
        image_link: model.image_link,
    }
}
