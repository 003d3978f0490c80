use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LogWorkItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LogWorkItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LogWorkItems::DailyLogId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LogWorkItems::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LogWorkItems::WorkItem)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LogWorkItems::WorkLocation).string_len(255))
                    .col(ColumnDef::new(LogWorkItems::DisasterTypes).text())
                    .col(ColumnDef::new(LogWorkItems::Countermeasures).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_log_work_items_daily_log_id")
                            .from(LogWorkItems::Table, LogWorkItems::DailyLogId)
                            .to(DailyLogs::Table, DailyLogs::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .name("idx_log_work_items_daily_log_id")
                    .table(LogWorkItems::Table)
                    .col(LogWorkItems::DailyLogId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LogWorkItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LogWorkItems {
    Table,
    Id,
    DailyLogId,
    SortOrder,
    WorkItem,
    WorkLocation,
    DisasterTypes,
    Countermeasures,
}

#[derive(DeriveIden)]
enum DailyLogs {
    Table,
    Id,
}
