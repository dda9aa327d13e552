use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Sessions {
    Table,
    Id,
    OperatorId,
    OpenedAt,
    ClosedAt,
    IsActive,
    OpeningCash,
    OpeningMvola,
    OpeningOrangeMoney,
    OpeningAirtelMoney,
    Cash,
    Mvola,
    OrangeMoney,
    AirtelMoney,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::OperatorId).string().not_null())
                    .col(ColumnDef::new(Sessions::OpenedAt).timestamp().not_null())
                    .col(ColumnDef::new(Sessions::ClosedAt).timestamp())
                    .col(ColumnDef::new(Sessions::IsActive).boolean().not_null())
                    .col(
                        ColumnDef::new(Sessions::OpeningCash)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::OpeningMvola)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::OpeningOrangeMoney)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::OpeningAirtelMoney)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Sessions::Cash).big_integer().not_null())
                    .col(ColumnDef::new(Sessions::Mvola).big_integer().not_null())
                    .col(
                        ColumnDef::new(Sessions::OrangeMoney)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sessions::AirtelMoney)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sessions-operator_id-is_active")
                    .table(Sessions::Table)
                    .col(Sessions::OperatorId)
                    .col(Sessions::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        Ok(())
    }
}
