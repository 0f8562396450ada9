use db::contract::Status;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contracts::Table)
                    .col(
                        ColumnDef::new(Contracts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contracts::CompanyId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Contracts::ContractType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contracts::EmployerName).string().not_null())
                    .col(ColumnDef::new(Contracts::EmployerCeo).string().not_null())
                    .col(
                        ColumnDef::new(Contracts::EmployerAddress)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contracts::EmployerPhone).string().not_null())
                    .col(ColumnDef::new(Contracts::WorkerName).string().not_null())
                    .col(ColumnDef::new(Contracts::WorkerBirth).string().not_null())
                    .col(ColumnDef::new(Contracts::WorkerPhone).string().not_null())
                    .col(ColumnDef::new(Contracts::WorkerAddress).string().not_null())
                    .col(ColumnDef::new(Contracts::StartDate).timestamp().not_null())
                    .col(ColumnDef::new(Contracts::EndDate).timestamp())
                    .col(ColumnDef::new(Contracts::WorkDays).string().not_null())
                    .col(ColumnDef::new(Contracts::WorkStart).string().not_null())
                    .col(ColumnDef::new(Contracts::WorkEnd).string().not_null())
                    .col(ColumnDef::new(Contracts::BreakMinutes).integer().not_null())
                    .col(ColumnDef::new(Contracts::HourlyWage).big_integer().not_null())
                    .col(ColumnDef::new(Contracts::PayDay).small_integer().not_null())
                    .col(ColumnDef::new(Contracts::SpecialTerms).text())
                    .col(ColumnDef::new(Contracts::EmployerSign).text())
                    .col(ColumnDef::new(Contracts::WorkerSign).text())
                    .col(
                        ColumnDef::new(Contracts::Status)
                            .string_len(16)
                            .not_null()
                            .default(Status::Draft),
                    )
                    .col(ColumnDef::new(Contracts::ContentHash).string_len(64))
                    .col(ColumnDef::new(Contracts::AnchorTx).string())
                    .col(ColumnDef::new(Contracts::SignedAt).timestamp())
                    .col(
                        ColumnDef::new(Contracts::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Contracts::Table, Contracts::CompanyId)
                            .to(crate::Companies::Table, crate::Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contracts::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
pub(crate) enum Contracts {
    Table,
    Id,
    CompanyId,
    ContractType,
    EmployerName,
    EmployerCeo,
    EmployerAddress,
    EmployerPhone,
    WorkerName,
    WorkerBirth,
    WorkerPhone,
    WorkerAddress,
    StartDate,
    EndDate,
    WorkDays,
    WorkStart,
    WorkEnd,
    BreakMinutes,
    HourlyWage,
    PayDay,
    SpecialTerms,
    EmployerSign,
    WorkerSign,
    Status,
    ContentHash,
    AnchorTx,
    SignedAt,
    CreatedAt,
}
