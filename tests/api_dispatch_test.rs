//! # 调度层集成测试
//!
//! 从 HTTP handler 入口打真实请求，验证动作路由、会话授权、
//! 信封结构与写锁排队行为。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use chrono::Utc;
use entity::projects;
use sea_orm::{EntityTrait, Set};
use serde_json::{Value, json};
use sitelog_api::api::dispatch::{handle_get, handle_post};
use sitelog_api::api::{ApiEnvelope, LockDomain, WriteGate};
use sitelog_api::config::AppConfig;
use sitelog_api::database::{ensure_default_admin, init_database, run_migrations};
use sitelog_api::server::AppState;
use sitelog_api::services::users::{UserPayload, UserService};
use tempfile::NamedTempFile;

async fn setup_state() -> (NamedTempFile, AppState) {
    let temp_db = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite:{}", temp_db.path().display());
    let db = init_database(&db_url).await.expect("数据库连接失败");
    run_migrations(&db).await.expect("数据库迁移失败");
    let config = AppConfig::default();
    ensure_default_admin(&db, &config.auth).await.expect("初始化管理员失败");
    (temp_db, AppState::new(db, Arc::new(config)))
}

async fn post(state: &AppState, body: Value) -> ApiEnvelope {
    handle_post(State(state.clone()), Query(HashMap::new()), body.to_string()).await
}

async fn login_admin(state: &AppState) -> String {
    let envelope = post(
        state,
        json!({"action": "authenticateUser", "account": "admin", "password": "admin123"}),
    )
    .await;
    assert!(envelope.success, "管理员登录失败: {:?}", envelope.message);
    envelope.token.expect("登录响应应带 token")
}

async fn seed_project(state: &AppState, seq_no: &str, name: &str) {
    let now = Utc::now().naive_utc();
    let project = projects::ActiveModel {
        seq_no: Set(seq_no.to_string()),
        name: Set(name.to_string()),
        status: Set("施工中".to_string()),
        resp: Set(Some("王主任".to_string())),
        resp_phone: Set(Some("0912345678".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    projects::Entity::insert(project)
        .exec(&state.db)
        .await
        .expect("插入工程失败");
}

#[tokio::test]
async fn test_unknown_action_reports_name() {
    let (_guard, state) = setup_state().await;

    let envelope = post(&state, json!({"action": "dropAllTables"})).await;
    assert!(!envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("Unknown action: dropAllTables"));
    assert!(envelope.stack.is_none(), "未知动作属客户端错误，不附堆栈");

    // 缺 action 视同空字串动作
    let missing = post(&state, json!({"foo": "bar"})).await;
    assert!(!missing.success);
    assert_eq!(missing.message.as_deref(), Some("Unknown action: "));
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let (_guard, state) = setup_state().await;

    let envelope = handle_post(
        State(state.clone()),
        Query(HashMap::new()),
        "{broken".to_string(),
    )
    .await;
    assert!(!envelope.success);
    let message = envelope.message.expect("应说明 body 不合法");
    assert!(message.contains("JSON"), "错误信息: {message}");

    // body 为 JSON 但不是物件
    let array_body = handle_post(
        State(state.clone()),
        Query(HashMap::new()),
        "[1, 2, 3]".to_string(),
    )
    .await;
    assert!(!array_body.success);
    assert!(
        array_body.message.unwrap_or_default().contains("JSON 物件"),
        "阵列 body 应被拒绝"
    );
}

#[tokio::test]
async fn test_login_session_roundtrip() {
    let (_guard, state) = setup_state().await;

    let rejected = post(
        &state,
        json!({"action": "authenticateUser", "account": "admin", "password": "nope"}),
    )
    .await;
    assert!(!rejected.success);
    assert_eq!(rejected.message.as_deref(), Some("帳號或密碼錯誤"));
    assert!(rejected.token.is_none());

    let login = post(
        &state,
        json!({"action": "authenticateUser", "account": "admin", "password": "admin123"}),
    )
    .await;
    assert!(login.success);
    assert_eq!(login.message.as_deref(), Some("登入成功"));
    let token = login.token.expect("登录响应应带 token");
    let user = login.user.expect("登录响应应带 user");
    assert_eq!(user["account"], "admin");
    assert_eq!(user["role"], "管理員");
    assert!(user.get("passwordHash").is_none(), "响应不得外泄密码哈希");

    // 会话查询同样把 user 放信封顶层
    let session = post(
        &state,
        json!({"action": "getCurrentSession", "sessionToken": token}),
    )
    .await;
    assert!(session.success);
    assert_eq!(session.user.expect("会话应回传 user")["account"], "admin");
    assert!(session.token.is_none());

    let logout = post(&state, json!({"action": "logoutUser", "sessionToken": token})).await;
    assert!(logout.success);
    assert_eq!(logout.message.as_deref(), Some("已登出"));

    let stale = post(
        &state,
        json!({"action": "getCurrentSession", "sessionToken": token}),
    )
    .await;
    assert!(!stale.success);
    assert_eq!(stale.message.as_deref(), Some("會話無效或已過期"));
}

#[tokio::test]
async fn test_access_levels_enforced() {
    let (_guard, state) = setup_state().await;

    let anonymous = post(&state, json!({"action": "getAllUsers"})).await;
    assert!(!anonymous.success);
    assert_eq!(anonymous.message.as_deref(), Some("請先登入"));

    let filler = UserPayload {
        user_id: None,
        row_index: None,
        account: Some("wang123".to_string()),
        name: Some("王小明".to_string()),
        dept: None,
        email: None,
        role: None,
        managed_projects: None,
        supervisor_email: None,
        password: Some("secret-9".to_string()),
    };
    UserService::new(&state.db, &state.config.auth)
        .create(filler)
        .await
        .expect("新增使用者失败");

    let filler_login = post(
        &state,
        json!({"action": "authenticateUser", "account": "wang123", "password": "secret-9"}),
    )
    .await;
    let filler_token = filler_login.token.expect("填表人登录失败");

    let forbidden = post(
        &state,
        json!({"action": "getAllUsers", "sessionToken": filler_token}),
    )
    .await;
    assert!(!forbidden.success);
    assert_eq!(forbidden.message.as_deref(), Some("權限不足"));

    // 权限检查先于一切处理，工程是否存在都不影响拒绝
    let project_edit = post(
        &state,
        json!({
            "action": "updateProjectInfo",
            "sessionToken": filler_token,
            "projectSeqNo": "P001",
            "projectStatus": "停工"
        }),
    )
    .await;
    assert!(!project_edit.success, "填表人不得修改工程资料");
    assert_eq!(project_edit.message.as_deref(), Some("權限不足"));

    // 填表人仍可使用一般动作
    let projects_ok = post(
        &state,
        json!({"action": "getAllProjects", "sessionToken": filler_token}),
    )
    .await;
    assert!(projects_ok.success);

    let admin_token = login_admin(&state).await;
    let allowed = post(
        &state,
        json!({"action": "getAllUsers", "sessionToken": admin_token}),
    )
    .await;
    assert!(allowed.success);
    let data = allowed.data.expect("使用者清单应有 data");
    assert!(data.as_array().is_some_and(|rows| rows.len() >= 2));
}

#[tokio::test]
async fn test_guest_summary_masks_contact_phone() {
    let (_guard, state) = setup_state().await;
    seed_project(&state, "P001", "中正橋改建").await;

    let guest = post(
        &state,
        json!({"action": "getDailySummaryReport", "dateString": "2024-06-12"}),
    )
    .await;
    assert!(guest.success, "访客应可读汇总: {:?}", guest.message);
    let guest_rows = guest.data.expect("应有 data")["rows"].clone();
    assert_eq!(guest_rows[0]["projectSeqNo"], "P001");
    assert!(guest_rows[0]["respPhone"].is_null(), "访客视角须遮罩电话");

    let token = login_admin(&state).await;
    let full = post(
        &state,
        json!({
            "action": "getDailySummaryReport",
            "sessionToken": token,
            "dateString": "2024-06-12"
        }),
    )
    .await;
    let full_rows = full.data.expect("应有 data")["rows"].clone();
    assert_eq!(full_rows[0]["respPhone"], "0912345678");
}

#[tokio::test]
async fn test_query_and_body_parameters_merge() {
    let (_guard, state) = setup_state().await;
    let token = login_admin(&state).await;

    // action 走 query string，其余参数走 body
    let mut query = HashMap::new();
    query.insert("action".to_string(), "checkHoliday".to_string());
    let envelope = handle_post(
        State(state.clone()),
        Query(query),
        json!({"sessionToken": token, "dateString": "2024-06-15"}).to_string(),
    )
    .await;
    assert!(envelope.success, "合并参数后应可执行: {:?}", envelope.message);
    let data = envelope.data.expect("应有 data");
    assert_eq!(data["isWeekend"], true);
    assert_eq!(data["isHoliday"], true);
}

#[tokio::test]
async fn test_get_endpoint_serves_readonly_actions() {
    let (_guard, state) = setup_state().await;
    let token = login_admin(&state).await;

    let mut query = HashMap::new();
    query.insert("action".to_string(), "checkHoliday".to_string());
    query.insert("sessionToken".to_string(), token);
    query.insert("dateString".to_string(), "2024-06-17".to_string());
    let envelope = handle_get(State(state.clone()), Query(query)).await;
    assert!(envelope.success);
    let data = envelope.data.expect("应有 data");
    assert_eq!(data["isWeekend"], false);
    assert_eq!(data["isHoliday"], false);
}

#[tokio::test]
async fn test_write_lock_timeout_reports_busy() {
    let (_guard, mut state) = setup_state().await;
    state.gate = Arc::new(WriteGate::new(Duration::from_millis(50)));
    let token = login_admin(&state).await;

    // 占住日志域写锁，模拟另一笔提交尚未完成
    let _held = state
        .gate
        .acquire(LockDomain::Logs)
        .await
        .expect("首次取锁失败");

    let envelope = post(
        &state,
        json!({"action": "submitDailyLog", "sessionToken": token, "projectSeqNo": "P001"}),
    )
    .await;
    assert!(!envelope.success);
    let message = envelope.message.expect("应回报资源忙碌");
    assert!(message.contains("资源忙碌"), "错误信息: {message}");
}
