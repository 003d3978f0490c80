use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DisasterTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DisasterTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DisasterTypes::Category)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DisasterTypes::TypeName)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DisasterTypes::IsCustom)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DisasterTypes::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 同分类下名称唯一
        manager
            .create_index(
                Index::create()
                    .name("idx_disaster_types_unique")
                    .table(DisasterTypes::Table)
                    .col(DisasterTypes::Category)
                    .col(DisasterTypes::TypeName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DisasterTypes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DisasterTypes {
    Table,
    Id,
    Category,
    TypeName,
    IsCustom,
    CreatedAt,
}
