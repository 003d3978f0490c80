//! # 填报流程集成测试
//!
//! 走真实 SQLite 数据库，覆盖提交、覆写、前一日回读、汇总编辑
//! 与批次假日填报的完整流程。

use chrono::{Local, Utc};
use entity::{daily_logs, holidays, log_work_items, modification_logs, projects};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde_json::json;
use sitelog_api::database::{init_database, run_migrations};
use sitelog_api::services::daily_logs::{
    DailyLogService, SubmitDailyLogPayload, UpdateSummaryPayload, WorkItemData,
};
use sitelog_api::services::holidays::HolidayService;
use sitelog_api::services::reports::ReportService;
use tempfile::NamedTempFile;

async fn setup_db() -> (NamedTempFile, DatabaseConnection) {
    let temp_db = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite:{}", temp_db.path().display());
    let db = init_database(&db_url).await.expect("数据库连接失败");
    run_migrations(&db).await.expect("数据库迁移失败");
    (temp_db, db)
}

async fn seed_project(db: &DatabaseConnection, seq_no: &str, name: &str, status: &str) {
    let now = Utc::now().naive_utc();
    let project = projects::ActiveModel {
        seq_no: Set(seq_no.to_string()),
        name: Set(name.to_string()),
        contractor: Set(Some("大安營造".to_string())),
        dept: Set(Some("北區工務段".to_string())),
        status: Set(status.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    projects::Entity::insert(project)
        .exec(db)
        .await
        .expect("插入工程失败");
}

fn submit_payload(seq_no: &str, date: &str) -> SubmitDailyLogPayload {
    SubmitDailyLogPayload {
        log_date: date.to_string(),
        project_seq_no: seq_no.to_string(),
        is_holiday_no_work: false,
        is_holiday_work: false,
        inspector_ids: Some(json!([1, 2])),
        workers_count: Some(json!(12)),
        work_items: vec![
            WorkItemData {
                work_item: "開挖作業".to_string(),
                work_location: Some("B1 基地".to_string()),
                disaster_types: vec!["倒塌".to_string(), "感電".to_string()],
                countermeasures: Some("設置擋土支撐".to_string()),
            },
            WorkItemData {
                work_item: "鋼筋綁紮".to_string(),
                work_location: None,
                disaster_types: vec![],
                countermeasures: None,
            },
        ],
    }
}

#[tokio::test]
async fn test_submit_creates_then_overwrites_single_row() {
    let (_guard, db) = setup_db().await;
    seed_project(&db, "P001", "中正橋改建", "施工中").await;
    let service = DailyLogService::new(&db);

    let created = service
        .submit(Some("王督導"), submit_payload("P001", "2024-06-12"))
        .await
        .expect("首次提交失败");
    assert_eq!(created.message.as_deref(), Some("填報成功"));
    assert_eq!(created.data.workers_count, 12);
    assert_eq!(created.data.work_items.len(), 2);
    assert_eq!(created.data.created_by.as_deref(), Some("王督導"));

    // 同一 (工程, 日期) 再次提交走覆写，不产生第二笔
    let mut second = submit_payload("P001", "2024-06-12");
    second.workers_count = Some(json!("8"));
    second.work_items.truncate(1);
    let updated = service
        .submit(Some("李工程師"), second)
        .await
        .expect("覆写提交失败");
    assert_eq!(updated.message.as_deref(), Some("填報已更新"));
    assert_eq!(updated.data.workers_count, 8);
    assert_eq!(updated.data.work_items.len(), 1);
    assert_eq!(updated.data.created_by.as_deref(), Some("李工程師"));

    let rows = daily_logs::Entity::find()
        .filter(daily_logs::Column::ProjectSeqNo.eq("P001"))
        .all(&db)
        .await
        .expect("查询填报失败");
    assert_eq!(rows.len(), 1, "覆写后应只有一笔填报");

    let items = log_work_items::Entity::find()
        .filter(log_work_items::Column::DailyLogId.eq(rows[0].id))
        .all(&db)
        .await
        .expect("查询工作项目失败");
    assert_eq!(items.len(), 1, "旧工作项目应随覆写清除");
}

#[tokio::test]
async fn test_holiday_no_work_clears_items_and_workers() {
    let (_guard, db) = setup_db().await;
    seed_project(&db, "P001", "中正橋改建", "施工中").await;

    let mut payload = submit_payload("P001", "2024-06-15");
    payload.is_holiday_no_work = true;
    let response = DailyLogService::new(&db)
        .submit(Some("王督導"), payload)
        .await
        .expect("假日不施工提交失败");

    assert!(response.data.is_holiday_no_work);
    assert_eq!(response.data.workers_count, 0, "假日不施工出工人数应归零");
    assert!(response.data.work_items.is_empty(), "假日不施工不应保留工作项目");
}

#[tokio::test]
async fn test_conflicting_holiday_flags_rejected() {
    let (_guard, db) = setup_db().await;
    seed_project(&db, "P001", "中正橋改建", "施工中").await;

    let mut payload = submit_payload("P001", "2024-06-15");
    payload.is_holiday_no_work = true;
    payload.is_holiday_work = true;
    let err = DailyLogService::new(&db)
        .submit(None, payload)
        .await
        .expect_err("互斥假日旗标应被拒绝");
    assert!(err.to_string().contains("不可同時勾選"), "错误信息: {err}");
}

#[tokio::test]
async fn test_submit_requires_at_least_one_work_item() {
    let (_guard, db) = setup_db().await;
    seed_project(&db, "P001", "中正橋改建", "施工中").await;

    let mut payload = submit_payload("P001", "2024-06-12");
    // 只剩空白项时视同未填
    payload.work_items = vec![WorkItemData {
        work_item: "   ".to_string(),
        work_location: None,
        disaster_types: vec![],
        countermeasures: None,
    }];
    let err = DailyLogService::new(&db)
        .submit(None, payload)
        .await
        .expect_err("无有效工作项目应被拒绝");
    assert!(err.to_string().contains("請至少填寫一項工作項目"), "错误信息: {err}");
}

#[tokio::test]
async fn test_previous_day_log_returns_content_verbatim() {
    let (_guard, db) = setup_db().await;
    seed_project(&db, "P001", "中正橋改建", "施工中").await;
    let service = DailyLogService::new(&db);

    service
        .submit(None, submit_payload("P001", "2024-06-10"))
        .await
        .expect("提交 06-10 失败");
    let mut later = submit_payload("P001", "2024-06-12");
    later.work_items[0].work_item = "模板組立".to_string();
    service.submit(None, later).await.expect("提交 06-12 失败");

    // 严格取早于指定日期的最近一笔
    let previous = service
        .previous_day_log("P001", "2024-06-13")
        .await
        .expect("查询前一日失败")
        .expect("应找到 06-12 的填报");
    assert_eq!(previous.log_date, "2024-06-12");
    assert_eq!(previous.work_items[0].work_item, "模板組立");
    assert_eq!(
        previous.work_items[0].disaster_types,
        vec!["倒塌".to_string(), "感電".to_string()]
    );

    let earlier = service
        .previous_day_log("P001", "2024-06-12")
        .await
        .expect("查询前一日失败")
        .expect("应找到 06-10 的填报");
    assert_eq!(earlier.log_date, "2024-06-10");

    let none = service
        .previous_day_log("P001", "2024-06-10")
        .await
        .expect("查询前一日失败");
    assert!(none.is_none(), "最早一笔之前应无资料");
}

#[tokio::test]
async fn test_last_log_for_project() {
    let (_guard, db) = setup_db().await;
    seed_project(&db, "P001", "中正橋改建", "施工中").await;
    let service = DailyLogService::new(&db);

    assert!(
        service
            .last_log_for_project("P001")
            .await
            .expect("查询最后填报失败")
            .is_none()
    );

    service
        .submit(None, submit_payload("P001", "2024-06-10"))
        .await
        .expect("提交失败");
    service
        .submit(None, submit_payload("P001", "2024-06-14"))
        .await
        .expect("提交失败");

    let last = service
        .last_log_for_project("P001")
        .await
        .expect("查询最后填报失败")
        .expect("应找到最后一笔填报");
    assert_eq!(last.log_date, "2024-06-14");
}

#[tokio::test]
async fn test_update_summary_log_leaves_modification_trail() {
    let (_guard, db) = setup_db().await;
    seed_project(&db, "P001", "中正橋改建", "施工中").await;
    let service = DailyLogService::new(&db);
    service
        .submit(Some("王督導"), submit_payload("P001", "2024-06-12"))
        .await
        .expect("提交失败");

    let payload = UpdateSummaryPayload {
        project_seq_no: "P001".to_string(),
        log_date: "2024-06-12".to_string(),
        workers_count: Some(json!(20)),
        inspector_ids: None,
        work_items: None,
        is_holiday_no_work: None,
        is_holiday_work: None,
        reason: Some("補正出工人數".to_string()),
    };
    let updated = service
        .update_summary_log("陳聯絡員", payload)
        .await
        .expect("汇总编辑失败");
    assert_eq!(updated.data.workers_count, 20);
    assert_eq!(updated.data.work_items.len(), 2, "未改动的工作项目应保留");

    let trail = modification_logs::Entity::find()
        .all(&db)
        .await
        .expect("查询修改纪录失败");
    assert_eq!(trail.len(), 1, "汇总编辑应留下一笔修改纪录");
    assert_eq!(trail[0].log_type, "daily_log");
    assert_eq!(trail[0].operator, "陳聯絡員");
    assert_eq!(trail[0].reason.as_deref(), Some("補正出工人數"));
    assert!(trail[0].old_data.is_some());
    assert!(trail[0].new_data.is_some());
}

#[tokio::test]
async fn test_update_summary_missing_log_rejected() {
    let (_guard, db) = setup_db().await;
    seed_project(&db, "P001", "中正橋改建", "施工中").await;

    let payload = UpdateSummaryPayload {
        project_seq_no: "P001".to_string(),
        log_date: "2024-06-12".to_string(),
        workers_count: Some(json!(5)),
        inspector_ids: None,
        work_items: None,
        is_holiday_no_work: None,
        is_holiday_work: None,
        reason: None,
    };
    let err = DailyLogService::new(&db)
        .update_summary_log("管理員", payload)
        .await
        .expect_err("无填报时编辑应被拒绝");
    assert!(err.to_string().contains("尚無填報資料"), "错误信息: {err}");
}

#[tokio::test]
async fn test_batch_holiday_logs_marks_weekend_and_is_idempotent() {
    let (_guard, db) = setup_db().await;
    seed_project(&db, "P001", "中正橋改建", "施工中").await;
    seed_project(&db, "P002", "南港隧道整修", "施工中").await;
    let service = HolidayService::new(&db);
    let seq_nos = vec!["P001".to_string(), "P002".to_string()];

    // 2024-06-15 为周六、06-16 为周日
    let first = service
        .batch_submit("管理員", "2024-06-10", "2024-06-16", &[0, 6], &seq_nos)
        .await
        .expect("批次假日填报失败");
    assert_eq!(first.data.created, 4, "两个周末日乘两个工程");
    assert_eq!(first.data.skipped, 0);
    assert_eq!(first.data.holidays_marked, 2);
    assert_eq!(first.message.as_deref(), Some("已建立 4 筆假日填報，略過 0 筆"));

    let logs = daily_logs::Entity::find().all(&db).await.expect("查询填报失败");
    assert_eq!(logs.len(), 4);
    for log in &logs {
        assert!(log.is_holiday_no_work);
        assert_eq!(log.workers_count, 0);
        assert_eq!(log.created_by.as_deref(), Some("管理員"));
    }

    let marked = holidays::Entity::find().all(&db).await.expect("查询假日失败");
    assert_eq!(marked.len(), 2);
    assert!(marked.iter().all(|h| h.is_holiday));

    // 重跑同一区间只补缺，不覆盖已有填报
    let second = service
        .batch_submit("管理員", "2024-06-10", "2024-06-16", &[0, 6], &seq_nos)
        .await
        .expect("批次假日填报重跑失败");
    assert_eq!(second.data.created, 0);
    assert_eq!(second.data.skipped, 4);
    assert_eq!(
        daily_logs::Entity::find().all(&db).await.expect("查询填报失败").len(),
        4,
        "重跑不应新增填报"
    );
}

#[tokio::test]
async fn test_batch_rejects_reversed_range_and_bad_weekday() {
    let (_guard, db) = setup_db().await;
    seed_project(&db, "P001", "中正橋改建", "施工中").await;
    let service = HolidayService::new(&db);
    let seq_nos = vec!["P001".to_string()];

    let reversed = service
        .batch_submit("管理員", "2024-06-16", "2024-06-10", &[6], &seq_nos)
        .await
        .expect_err("起迄颠倒应被拒绝");
    assert!(reversed.to_string().contains("開始日期不可晚於結束日期"));

    let bad_day = service
        .batch_submit("管理員", "2024-06-10", "2024-06-16", &[7], &seq_nos)
        .await
        .expect_err("非法星期值应被拒绝");
    assert!(bad_day.to_string().contains("targetDays"));
}

#[tokio::test]
async fn test_unfilled_for_tomorrow_excludes_logged_projects() {
    let (_guard, db) = setup_db().await;
    seed_project(&db, "P001", "中正橋改建", "施工中").await;
    seed_project(&db, "P002", "南港隧道整修", "施工中").await;
    seed_project(&db, "P003", "已完工案", "完工").await;

    let tomorrow = Local::now()
        .date_naive()
        .succ_opt()
        .expect("计算明日失败")
        .format("%Y-%m-%d")
        .to_string();
    DailyLogService::new(&db)
        .submit(None, submit_payload("P001", &tomorrow))
        .await
        .expect("提交明日填报失败");

    let report = ReportService::new(&db)
        .unfilled_for_tomorrow()
        .await
        .expect("查询未填报清单失败");
    assert_eq!(report.date, tomorrow);
    let seq_nos: Vec<&str> = report.projects.iter().map(|p| p.project_seq_no.as_str()).collect();
    assert_eq!(seq_nos, vec!["P002"], "已填报与非施工中工程不应入列");

    let count = ReportService::new(&db)
        .unfilled_count()
        .await
        .expect("查询未填报数量失败");
    assert_eq!(count.count, 1);
}
