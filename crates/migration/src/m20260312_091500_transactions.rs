use sea_orm_migration::prelude::*;

use crate::m20260312_090000_sessions::Sessions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    SessionId,
    Seq,
    Kind,
    Service,
    Amount,
    Fee,
    PhoneNumber,
    RecipientName,
    RecipientPhone,
    Description,
    OccurredAt,
    Status,
    CreatedBy,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::SessionId).string().not_null())
                    .col(ColumnDef::new(Transactions::Seq).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Service).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Fee).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::PhoneNumber).string())
                    .col(ColumnDef::new(Transactions::RecipientName).string())
                    .col(ColumnDef::new(Transactions::RecipientPhone).string())
                    .col(ColumnDef::new(Transactions::Description).string())
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(ColumnDef::new(Transactions::CreatedBy).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-session_id")
                            .from(Transactions::Table, Transactions::SessionId)
                            .to(Sessions::Table, Sessions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-session_id-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::SessionId)
                    .col(Transactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-session_id-seq")
                    .table(Transactions::Table)
                    .col(Transactions::SessionId)
                    .col(Transactions::Seq)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        Ok(())
    }
}
