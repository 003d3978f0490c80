use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 内建灾害类型字典，分类与名称沿用职业灾害分类惯例
const CATALOG: &[(&str, &str)] = &[
    ("人體傷害", "墜落"),
    ("人體傷害", "跌倒"),
    ("人體傷害", "衝撞"),
    ("人體傷害", "被撞"),
    ("人體傷害", "被夾、被捲"),
    ("人體傷害", "被切、割、擦傷"),
    ("物理災害", "物體飛落"),
    ("物理災害", "倒塌、崩塌"),
    ("物理災害", "感電"),
    ("物理災害", "與高溫、低溫之接觸"),
    ("環境災害", "火災"),
    ("環境災害", "爆炸"),
    ("環境災害", "物體破裂"),
    ("環境災害", "中毒、缺氧"),
    ("其他", "溺斃"),
    ("其他", "交通事故"),
    ("其他", "其他"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 插入内建灾害类型字典
        let mut insert = Query::insert()
            .into_table(DisasterTypes::Table)
            .columns([
                DisasterTypes::Category,
                DisasterTypes::TypeName,
                DisasterTypes::IsCustom,
            ])
            .to_owned();
        for (category, type_name) in CATALOG {
            insert.values_panic([(*category).into(), (*type_name).into(), false.into()]);
        }
        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 只删除内建项，保留自订项
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(DisasterTypes::Table)
                    .and_where(Expr::col(DisasterTypes::IsCustom).eq(false))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum DisasterTypes {
    Table,
    Category,
    TypeName,
    IsCustom,
}
