//! Migration to create the call_logs table.
//!
//! One row per inbound call webhook, shared by every provider path. Rows are
//! insert-only; the `from_number` index backs the prior-call count.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CallLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CallLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(CallLogs::Provider).text().not_null())
                    .col(ColumnDef::new(CallLogs::ToNumber).text().not_null())
                    .col(ColumnDef::new(CallLogs::FromNumber).text().not_null())
                    .col(ColumnDef::new(CallLogs::Name).text().not_null())
                    .col(ColumnDef::new(CallLogs::Source).text().not_null())
                    .col(
                        ColumnDef::new(CallLogs::FirstCall)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CallLogs::PriorCalls)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CallLogs::Sid).text().null())
                    .col(ColumnDef::new(CallLogs::ResourceId).text().null())
                    .col(
                        ColumnDef::new(CallLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_call_logs_from_number")
                    .table(CallLogs::Table)
                    .col(CallLogs::FromNumber)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_call_logs_from_number")
                    .table(CallLogs::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(CallLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CallLogs {
    Table,
    Id,
    Provider,
    ToNumber,
    FromNumber,
    Name,
    Source,
    FirstCall,
    PriorCalls,
    Sid,
    ResourceId,
    CreatedAt,
}
