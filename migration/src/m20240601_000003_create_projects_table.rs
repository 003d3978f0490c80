use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Projects::SeqNo)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Projects::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Projects::FullName).string_len(255))
                    .col(ColumnDef::new(Projects::Contractor).string_len(128))
                    .col(ColumnDef::new(Projects::Dept).string_len(64))
                    .col(ColumnDef::new(Projects::Address).string_len(255))
                    .col(ColumnDef::new(Projects::Gps).string_len(64))
                    .col(ColumnDef::new(Projects::Resp).string_len(64))
                    .col(ColumnDef::new(Projects::RespPhone).string_len(32))
                    .col(ColumnDef::new(Projects::SafetyOfficer).string_len(64))
                    .col(ColumnDef::new(Projects::SafetyPhone).string_len(32))
                    .col(ColumnDef::new(Projects::SafetyLicense).string_len(64))
                    .col(
                        ColumnDef::new(Projects::Status)
                            .string_len(16)
                            .not_null()
                            .default("施工中"),
                    )
                    .col(ColumnDef::new(Projects::StatusRemark).text())
                    .col(ColumnDef::new(Projects::DefaultInspectors).text())
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Projects::UpdatedAt)
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
                    .name("idx_projects_status")
                    .table(Projects::Table)
                    .col(Projects::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_dept")
                    .table(Projects::Table)
                    .col(Projects::Dept)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    SeqNo,
    Name,
    FullName,
    Contractor,
    Dept,
    Address,
    Gps,
    Resp,
    RespPhone,
    SafetyOfficer,
    SafetyPhone,
    SafetyLicense,
    Status,
    StatusRemark,
    DefaultInspectors,
    CreatedAt,
    UpdatedAt,
}
