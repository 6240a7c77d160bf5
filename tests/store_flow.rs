mod common;

use chrono::NaiveDate;
use common::test_db;
use myfridge::{
    db::in_transaction,
    dto::{products::ProductInput, users::UserInput},
    entity::{products, user_products, users},
    error::StoreError,
    services::{
        product_service::{self, format_product},
        user_service::{self, format_user},
    },
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};

fn aspirin() -> ProductInput {
    ProductInput {
        name: "Aspirin".into(),
        description: Some("Pain relief".into()),
        weight: "200mg".into(),
        quantity: "30".into(),
        date_purchased: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        image_link: None,
    }
}

fn jane() -> UserInput {
    UserInput {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        age: 34,
        current_products: Some("Aspirin".into()),
        past_products: None,
    }
}

async fn links_of_user(db: &DatabaseConnection, user_id: i32) -> u64 {
    user_products::Entity::find()
        .filter(user_products::Column::UserId.eq(user_id))
        .count(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn product_round_trips_through_format() {
    let db = test_db().await;

    let stored = product_service::insert_product(&db, aspirin()).await.unwrap();
    let product = format_product(product_service::find_product(&db, stored.id).await.unwrap());

    assert!(product.id > 0);
    assert_eq!(product.name, "Aspirin");
    assert_eq!(product.description.as_deref(), Some("Pain relief"));
    assert_eq!(product.weight, "200mg");
    assert_eq!(product.quantity, "30");
    assert_eq!(product.date_purchased, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert_eq!(product.image_link, None);
}

#[tokio::test]
async fn products_list_newest_name_first() {
    let db = test_db().await;
    for name in ["Aspirin", "Zinc", "Melatonin"] {
        let mut input = aspirin();
        input.name = name.into();
        product_service::insert_product(&db, input).await.unwrap();
    }

    let names: Vec<String> = product_service::list_products(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();

    assert_eq!(names, ["Zinc", "Melatonin", "Aspirin"]);
}

#[tokio::test]
async fn user_registration_date_survives_updates() {
    let db = test_db().await;
    let created = user_service::insert_user(&db, jane()).await.unwrap();

    let mut changed = jane();
    changed.age = 35;
    changed.past_products = Some("Ibuprofen".into());
    let updated = user_service::update_user(&db, created.id, changed).await.unwrap();

    let user = format_user(updated);
    assert_eq!(user.age, Some(35));
    assert_eq!(user.past_products.as_deref(), Some("Ibuprofen"));
    assert_eq!(user.date_registered, format_user(created).date_registered);
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let db = test_db().await;

    assert!(matches!(
        product_service::find_product(&db, 999).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        product_service::delete_product(&db, 999).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        product_service::update_product(&db, 999, aspirin()).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        user_service::delete_user(&db, 999).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn linking_is_idempotent_and_checks_both_sides() {
    let db = test_db().await;
    let user = user_service::insert_user(&db, jane()).await.unwrap();
    let product = product_service::insert_product(&db, aspirin()).await.unwrap();

    user_service::link_product(&db, user.id, product.id).await.unwrap();
    user_service::link_product(&db, user.id, product.id).await.unwrap();
    assert_eq!(links_of_user(&db, user.id).await, 1);

    let linked = user_service::products_of_user(&db, &user).await.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].name, "Aspirin");

    assert!(matches!(
        user_service::link_product(&db, user.id, 999).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        user_service::link_product(&db, 999, product.id).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn deleting_user_removes_its_links_only() {
    let db = test_db().await;
    let user = user_service::insert_user(&db, jane()).await.unwrap();
    let product = product_service::insert_product(&db, aspirin()).await.unwrap();
    user_service::link_product(&db, user.id, product.id).await.unwrap();

    user_service::delete_user(&db, user.id).await.unwrap();

    assert_eq!(links_of_user(&db, user.id).await, 0);
    assert!(product_service::find_product(&db, product.id).await.is_ok());
}

#[tokio::test]
async fn deleting_product_removes_its_links() {
    let db = test_db().await;
    let user = user_service::insert_user(&db, jane()).await.unwrap();
    let product = product_service::insert_product(&db, aspirin()).await.unwrap();
    user_service::link_product(&db, user.id, product.id).await.unwrap();

    product_service::delete_product(&db, product.id).await.unwrap();

    assert_eq!(links_of_user(&db, user.id).await, 0);
    assert!(user_service::find_user(&db, user.id).await.is_ok());
}

#[tokio::test]
async fn schema_cascades_link_rows_on_raw_delete() {
    let db = test_db().await;
    let user = user_service::insert_user(&db, jane()).await.unwrap();
    let product = product_service::insert_product(&db, aspirin()).await.unwrap();
    user_service::link_product(&db, user.id, product.id).await.unwrap();
    assert_eq!(links_of_user(&db, user.id).await, 1);

    let result = users::Entity::delete_by_id(user.id).exec(&db).await.unwrap();

    assert_eq!(result.rows_affected, 1);
    assert_eq!(links_of_user(&db, user.id).await, 0);
    assert!(
        products::Entity::find_by_id(product.id)
            .one(&db)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn failed_transaction_rolls_back() {
    let db = test_db().await;

    let result: Result<(), StoreError> = in_transaction(&db, |txn| {
        Box::pin(async move {
            product_service::insert_product(txn, aspirin()).await?;
            Err(StoreError::Constraint("forced failure".into()))
        })
    })
    .await;

    assert!(matches!(result, Err(StoreError::Constraint(_))));
    assert!(product_service::list_products(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn committed_transaction_is_visible() {
    let db = test_db().await;

    let id = in_transaction(&db, |txn| {
        Box::pin(async move {
            let product = product_service::insert_product(txn, aspirin()).await?;
            Ok(product.id)
        })
    })
    .await
    .unwrap();

    assert_eq!(product_service::find_product(&db, id).await.unwrap().name, "Aspirin");
}

#[tokio::test]
async fn concurrent_edits_leave_one_whole_version() {
    let db = test_db().await;
    let id = product_service::insert_product(&db, aspirin()).await.unwrap().id;

    let mut first = aspirin();
    first.name = "Aspirin 81".into();
    first.quantity = "90".into();
    let mut second = aspirin();
    second.name = "Aspirin 325".into();
    second.quantity = "24".into();

    let (a, b) = tokio::join!(
        in_transaction(&db, move |txn| Box::pin(async move {
            product_service::update_product(txn, id, first).await
        })),
        in_transaction(&db, move |txn| Box::pin(async move {
            product_service::update_product(txn, id, second).await
        })),
    );
    a.unwrap();
    b.unwrap();

    let stored = product_service::find_product(&db, id).await.unwrap();
    let pair = (stored.name.as_str(), stored.quantity.as_str());
    assert!(
        pair == ("Aspirin 81", "90") || pair == ("Aspirin 325", "24"),
        "mixed row: {pair:?}"
    );
}

#[tokio::test]
async fn sequential_edits_last_write_wins() {
    let db = test_db().await;
    let id = product_service::insert_product(&db, aspirin()).await.unwrap().id;

    for quantity in ["10", "20", "30"] {
        let mut input = aspirin();
        input.quantity = quantity.into();
        product_service::update_product(&db, id, input).await.unwrap();
    }

    assert_eq!(product_service::find_product(&db, id).await.unwrap().quantity, "30");
}

#[tokio::test]
async fn dangling_link_is_a_constraint_violation() {
    let db = test_db().await;

    let err = user_products::ActiveModel {
        user_id: Set(41),
        product_id: Set(42),
    }
    .insert(&db)
    .await
    .unwrap_err();

    assert!(matches!(StoreError::from(err), StoreError::Constraint(_)));
}
