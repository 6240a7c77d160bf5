use chrono::NaiveDate;
use myfridge::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{products::ProductInput, users::UserInput},
    services::{product_service, user_service},
};
use sea_orm::TransactionTrait;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let txn = orm.begin().await?;

    let users = [("Ada", "Lovelace", 36), ("Alan", "Turing", 41)];
    let mut user_ids = Vec::new();
    for (first_name, last_name, age) in users {
        let user = user_service::insert_user(
            &txn,
            UserInput {
                first_name: first_name.into(),
                last_name: last_name.into(),
                age,
                current_products: None,
                past_products: None,
            },
        )
        .await?;
        println!("Seeded user {first_name} {last_name} (id={})", user.id);
        user_ids.push(user.id);
    }

    let products = [
        ("Aspirin", "Pain relief", "200mg", "30", (2024, 1, 15)),
        ("Vitamin D", "Daily supplement", "1000IU", "90", (2024, 2, 1)),
        ("Amoxicillin", "Antibiotic course", "500mg", "21", (2024, 3, 10)),
    ];
    for (index, (name, description, weight, quantity, (y, m, d))) in
        products.into_iter().enumerate()
    {
        let date_purchased = NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| anyhow::anyhow!("invalid seed date {y}-{m}-{d}"))?;
        let product = product_service::insert_product(
            &txn,
            ProductInput {
                name: name.into(),
                description: Some(description.into()),
                weight: weight.into(),
                quantity: quantity.into(),
                date_purchased,
                image_link: None,
            },
        )
        .await?;

        let owner = user_ids[index % user_ids.len()];
        user_service::link_product(&txn, owner, product.id).await?;
        println!("Seeded product {name} (id={}) for user {owner}", product.id);
    }

    txn.commit().await?;
    println!("Seed completed");
    Ok(())
}
