use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Holidays::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Holidays::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Holidays::HolidayDate)
                            .date()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Holidays::IsHoliday)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Holidays::Remark).string_len(128))
                    .col(
                        ColumnDef::new(Holidays::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Holidays::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Holidays::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Holidays {
    Table,
    Id,
    HolidayDate,
    IsHoliday,
    Remark,
    CreatedAt,
    UpdatedAt,
}
