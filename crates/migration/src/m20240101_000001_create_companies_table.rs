use db::company::Status;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .col(
                        ColumnDef::new(Companies::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Companies::Name).string().not_null())
                    .col(ColumnDef::new(Companies::CeoName).string().not_null())
                    .col(
                        ColumnDef::new(Companies::BusinessNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Companies::Address).string().not_null())
                    .col(ColumnDef::new(Companies::Phone).string().not_null())
                    .col(
                        ColumnDef::new(Companies::Status)
                            .string_len(16)
                            .not_null()
                            .default(Status::Active),
                    )
                    .col(
                        ColumnDef::new(Companies::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
pub(crate) enum Companies {
    Table,
    Id,
    Name,
    CeoName,
    BusinessNumber,
    Address,
    Phone,
    Status,
    CreatedAt,
}
