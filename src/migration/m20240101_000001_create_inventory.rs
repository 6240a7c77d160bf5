use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(ColumnDef::new(Users::Age).integer())
                    .col(ColumnDef::new(Users::CurrentProducts).string())
                    .col(ColumnDef::new(Users::PastProducts).string())
                    .col(
                        ColumnDef::new(Users::DateRegistered)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Description).string())
                    .col(ColumnDef::new(Products::Weight).string().not_null())
                    .col(ColumnDef::new(Products::Quantity).string().not_null())
                    .col(ColumnDef::new(Products::DatePurchased).date().not_null())
                    .col(ColumnDef::new(Products::ImageLink).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserProducts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserProducts::UserId).integer().not_null())
                    .col(ColumnDef::new(UserProducts::ProductId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserProducts::UserId)
                            .col(UserProducts::ProductId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_products_user")
                            .from(UserProducts::Table, UserProducts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_products_product")
                            .from(UserProducts::Table, UserProducts::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserProducts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Age,
    CurrentProducts,
    PastProducts,
    DateRegistered,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    Weight,
    Quantity,
    DatePurchased,
    ImageLink,
}

#[derive(DeriveIden)]
enum UserProducts {
    Table,
    UserId,
    ProductId,
}
