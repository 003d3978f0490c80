use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModificationLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModificationLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ModificationLogs::LogType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ModificationLogs::ProjectSeqNo).string_len(32))
                    .col(ColumnDef::new(ModificationLogs::OldData).text())
                    .col(ColumnDef::new(ModificationLogs::NewData).text())
                    .col(ColumnDef::new(ModificationLogs::Reason).text())
                    .col(
                        ColumnDef::new(ModificationLogs::ActionType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ModificationLogs::Operator)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ModificationLogs::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .name("idx_modification_logs_project_seq_no")
                    .table(ModificationLogs::Table)
                    .col(ModificationLogs::ProjectSeqNo)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModificationLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ModificationLogs {
    Table,
    Id,
    LogType,
    ProjectSeqNo,
    OldData,
    NewData,
    Reason,
    ActionType,
    Operator,
    CreatedAt,
}
