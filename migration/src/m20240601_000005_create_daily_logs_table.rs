use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DailyLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DailyLogs::ProjectSeqNo)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyLogs::LogDate).date().not_null())
                    .col(
                        ColumnDef::new(DailyLogs::IsHolidayNoWork)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DailyLogs::IsHolidayWork)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(DailyLogs::InspectorIds).text())
                    .col(
                        ColumnDef::new(DailyLogs::WorkersCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DailyLogs::CreatedBy).string_len(64))
                    .col(
                        ColumnDef::new(DailyLogs::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DailyLogs::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一工程同一日期只允许一笔填报
        manager
            .create_index(
                Index::create()
                    .name("idx_daily_logs_unique_project_date")
                    .table(DailyLogs::Table)
                    .col(DailyLogs::ProjectSeqNo)
                    .col(DailyLogs::LogDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_daily_logs_log_date")
                    .table(DailyLogs::Table)
                    .col(DailyLogs::LogDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DailyLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DailyLogs {
    Table,
    Id,
    ProjectSeqNo,
    LogDate,
    IsHolidayNoWork,
    IsHolidayWork,
    InspectorIds,
    WorkersCount,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
