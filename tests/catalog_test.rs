//! # 表单字典集成测试
//!
//! 覆盖灾害类型目录的分组与自订追加，以及监工名册的重复管控。

use pretty_assertions::assert_eq;
use sea_orm::DatabaseConnection;
use sitelog_api::database::{init_database, run_migrations};
use sitelog_api::services::disaster_types::DisasterTypeService;
use sitelog_api::services::inspectors::{InspectorPayload, InspectorService};
use tempfile::NamedTempFile;

async fn setup_db() -> (NamedTempFile, DatabaseConnection) {
    let temp_db = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite:{}", temp_db.path().display());
    let db = init_database(&db_url).await.expect("数据库连接失败");
    run_migrations(&db).await.expect("数据库迁移失败");
    (temp_db, db)
}

fn inspector(name: &str, title: Option<&str>) -> InspectorPayload {
    InspectorPayload {
        id: None,
        name: Some(name.to_string()),
        title: title.map(str::to_string),
    }
}

#[tokio::test]
async fn test_disaster_catalog_grouped_in_seed_order() {
    let (_guard, db) = setup_db().await;
    let groups = DisasterTypeService::new(&db)
        .list_grouped()
        .await
        .expect("读取灾害类型失败");

    let categories: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
    assert_eq!(categories, vec!["人體傷害", "物理災害", "環境災害", "其他"]);
    assert_eq!(groups[0].types[0], "墜落");
    assert_eq!(groups[3].types.last().map(String::as_str), Some("其他"));
    let total: usize = groups.iter().map(|g| g.types.len()).sum();
    assert_eq!(total, 17, "内建字典共 17 项");
}

#[tokio::test]
async fn test_save_custom_disaster_type_idempotent() {
    let (_guard, db) = setup_db().await;
    let service = DisasterTypeService::new(&db);

    let first = service.save_custom("局限空間作業").await.expect("写入失败");
    assert!(first.data.created);
    assert_eq!(first.message.as_deref(), Some("自訂災害類型已新增"));

    let groups = service.list_grouped().await.expect("读取失败");
    let custom = groups
        .iter()
        .find(|g| g.category == "自訂")
        .expect("应出现自订类别");
    assert_eq!(custom.types, vec!["局限空間作業".to_string()]);

    // 重复写入不产生第二笔
    let second = service.save_custom("局限空間作業").await.expect("写入失败");
    assert!(!second.data.created);
    assert_eq!(second.message.as_deref(), Some("災害類型已存在"));
    let groups = service.list_grouped().await.expect("读取失败");
    let custom = groups.iter().find(|g| g.category == "自訂").unwrap();
    assert_eq!(custom.types.len(), 1);

    // 与内建同名也视为已存在
    let builtin = service.save_custom("墜落").await.expect("写入失败");
    assert!(!builtin.data.created);

    let blank = service.save_custom("   ").await;
    assert!(blank.is_err(), "空白类型应被拒绝");
}

#[tokio::test]
async fn test_inspector_duplicate_name_title_rejected() {
    let (_guard, db) = setup_db().await;
    let service = InspectorService::new(&db);

    service.create(inspector("陳工", Some("主任"))).await.expect("新增失败");

    let dup = service
        .create(inspector("陳工", Some("主任")))
        .await
        .expect_err("同名同职称应被拒绝");
    assert!(dup.to_string().contains("同名同職稱的監工已存在"), "错误信息: {dup}");

    // 同名不同职称允许
    let other_title = service.create(inspector("陳工", Some("工程師"))).await;
    assert!(other_title.is_ok());
    let no_title = service.create(inspector("陳工", None)).await;
    assert!(no_title.is_ok());
    let dup_no_title = service.create(inspector("陳工", None)).await;
    assert!(dup_no_title.is_err(), "同名且同样无职称应被拒绝");
}

#[tokio::test]
async fn test_inspector_update_keeps_unset_fields() {
    let (_guard, db) = setup_db().await;
    let service = InspectorService::new(&db);

    let created = service
        .create(inspector("林工", Some("主任")))
        .await
        .expect("新增失败");

    let updated = service
        .update(InspectorPayload {
            id: Some(created.data.id),
            name: None,
            title: Some("所長".to_string()),
        })
        .await
        .expect("更新失败");
    assert_eq!(updated.data.name, "林工", "未传姓名时保留原值");
    assert_eq!(updated.data.title.as_deref(), Some("所長"));
    assert_eq!(updated.message.as_deref(), Some("監工更新成功"));

    let missing_id = service
        .update(InspectorPayload {
            id: None,
            name: Some("張工".to_string()),
            title: None,
        })
        .await;
    assert!(missing_id.is_err(), "缺 id 应被拒绝");
}
