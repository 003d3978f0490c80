use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inspectors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Inspectors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Inspectors::Name).string_len(64).not_null())
                    .col(ColumnDef::new(Inspectors::Title).string_len(64))
                    .col(
                        ColumnDef::new(Inspectors::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Inspectors::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 同名同职称不得重复建立
        manager
            .create_index(
                Index::create()
                    .name("idx_inspectors_unique_name_title")
                    .table(Inspectors::Table)
                    .col(Inspectors::Name)
                    .col(Inspectors::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Inspectors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Inspectors {
    Table,
    Id,
    Name,
    Title,
    CreatedAt,
    UpdatedAt,
}
