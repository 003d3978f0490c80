//! # 动作调度器
//!
//! 单一入口受理所有 API 动作: 合并参数、解析动作名、检查会话与授权、
//! 取得域写锁后分派到对应服务。任何结果都以统一信封回传，HTTP 状态码恒为 200。

use std::collections::HashMap;

use axum::extract::{Query, State};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::action::{AccessLevel, Action};
use crate::api::envelope::ApiEnvelope;
use crate::api::params::ParamBag;
use crate::auth::{AuthContext, AuthService, SessionService};
use crate::error::{Result, SiteLogError};
use crate::server::AppState;
use crate::services::ServiceResponse;
use crate::services::daily_logs::DailyLogService;
use crate::services::disaster_types::DisasterTypeService;
use crate::services::holidays::HolidayService;
use crate::services::inspectors::InspectorService;
use crate::services::modification_logs::{ModificationEntry, ModificationLogService};
use crate::services::projects::ProjectService;
use crate::services::reports::{ReportService, SummaryRequest, SummaryViewer};
use crate::services::tbm::{TbmRequest, TbmService};
use crate::services::users::{UserPayload, UserService, UserView};

/// 未登录时的统一提示
const MSG_LOGIN_REQUIRED: &str = "請先登入";
/// 权限不足时的统一提示
const MSG_FORBIDDEN: &str = "權限不足";
/// 登录失败不区分帐号不存在与密码错误
const MSG_BAD_CREDENTIALS: &str = "帳號或密碼錯誤";
/// 会话查询失败提示
const MSG_SESSION_INVALID: &str = "會話無效或已過期";

/// GET 入口，参数全部来自 query string
pub async fn handle_get(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiEnvelope {
    dispatch(&state, query, "").await
}

/// POST 入口，query 与 JSON body 合并后处理
///
/// 旧版前端以 `text/plain` 送出 JSON，因此收原始字符串自行解析。
pub async fn handle_post(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> ApiEnvelope {
    dispatch(&state, query, &body).await
}

async fn dispatch(state: &AppState, query: HashMap<String, String>, body: &str) -> ApiEnvelope {
    let bag = match ParamBag::from_request(query, body) {
        Ok(bag) => bag,
        Err(e) => return ApiEnvelope::from_error(&e),
    };

    let name = bag.string("action").unwrap_or_default();
    let Some(action) = Action::parse(&name) else {
        warn!(action = %name, "拒绝未知动作");
        return ApiEnvelope::failure(format!("Unknown action: {name}"));
    };
    debug!(action = %action, "受理 API 动作");

    let ctx = match resolve_session(state, &bag).await {
        Ok(ctx) => ctx,
        Err(e) => return ApiEnvelope::from_error(&e),
    };

    if let Some(denied) = check_access(action, ctx.as_ref()) {
        return denied;
    }

    // 写动作先取域锁，超时即回可重试的失败
    let _guard = match action.lock_domain() {
        Some(domain) => match state.gate.acquire(domain).await {
            Ok(guard) => Some(guard),
            Err(e) => return ApiEnvelope::from_error(&e),
        },
        None => None,
    };

    match execute(state, action, &bag, ctx).await {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(action = %action, error = %e, "动作执行失败");
            ApiEnvelope::from_error(&e)
        }
    }
}

async fn resolve_session(state: &AppState, bag: &ParamBag) -> Result<Option<AuthContext>> {
    match bag.string("sessionToken") {
        Some(token) if !token.trim().is_empty() => {
            SessionService::new(&state.db).resolve(&token).await
        }
        _ => Ok(None),
    }
}

/// 依动作的授权等级拦下会话不足的请求，放行时回传 `None`
fn check_access(action: Action, ctx: Option<&AuthContext>) -> Option<ApiEnvelope> {
    let denied = match (action.access_level(), ctx) {
        (AccessLevel::Public, _) => return None,
        (_, None) => MSG_LOGIN_REQUIRED,
        (AccessLevel::User, Some(_)) => return None,
        (AccessLevel::AdminOrLiaison, Some(ctx)) if ctx.is_admin() || ctx.is_liaison() => {
            return None;
        }
        (AccessLevel::Admin, Some(ctx)) if ctx.is_admin() => return None,
        (_, Some(ctx)) => {
            warn!(action = %action, account = %ctx.user.account, "授权不足，拒绝动作");
            MSG_FORBIDDEN
        }
    };
    Some(ApiEnvelope::failure(denied))
}

#[allow(clippy::too_many_lines)]
async fn execute(
    state: &AppState,
    action: Action,
    bag: &ParamBag,
    ctx: Option<AuthContext>,
) -> Result<ApiEnvelope> {
    let db = &state.db;
    match action {
        Action::AuthenticateUser => {
            let account = bag.string("account").unwrap_or_default();
            let password = bag.string("password").unwrap_or_default();
            let outcome = AuthService::new(db, &state.config.auth)
                .authenticate(&account, &password)
                .await?;
            match outcome {
                Some(login) => Ok(ApiEnvelope::login(
                    serde_json::to_value(&login.user)?,
                    login.token,
                    "登入成功",
                )),
                None => Ok(ApiEnvelope::failure(MSG_BAD_CREDENTIALS)),
            }
        }
        Action::ChangeUserPassword => {
            let ctx = current(ctx.as_ref())?;
            let account = bag.string("account").unwrap_or_default();
            let old_password = bag.string("oldPassword").unwrap_or_default();
            let new_password = bag.string("newPassword").unwrap_or_default();
            let response = AuthService::new(db, &state.config.auth)
                .change_password(ctx, &account, &old_password, &new_password)
                .await?;
            Ok(message_envelope(response))
        }
        Action::GetCurrentSession => match ctx {
            Some(ctx) => {
                let user = serde_json::to_value(UserView::from_model(ctx.user))?;
                Ok(ApiEnvelope::session(user))
            }
            None => Ok(ApiEnvelope::failure(MSG_SESSION_INVALID)),
        },
        Action::LogoutUser => {
            if let Some(token) = bag.string("sessionToken") {
                SessionService::new(db).revoke(&token).await?;
            }
            Ok(ApiEnvelope::ok_message("已登出"))
        }
        Action::GetAllUsers => {
            data_envelope(&UserService::new(db, &state.config.auth).list().await?)
        }
        Action::GetUserByAccount => {
            let account = bag.require_string("account")?;
            let user = UserService::new(db, &state.config.auth)
                .get_by_account(account.trim())
                .await?;
            data_envelope(&user)
        }
        Action::AddUser => {
            let payload = user_payload(bag)?;
            respond(
                UserService::new(db, &state.config.auth)
                    .create(payload)
                    .await?,
            )
        }
        Action::UpdateUser => {
            let payload = user_payload(bag)?;
            respond(
                UserService::new(db, &state.config.auth)
                    .update(payload)
                    .await?,
            )
        }
        Action::DeleteUser => {
            let user_id = require_i32(bag, "userId")?;
            let response = UserService::new(db, &state.config.auth)
                .delete(user_id)
                .await?;
            Ok(message_envelope(response))
        }
        Action::SendTemporaryPassword => {
            let input = bag
                .string("account")
                .or_else(|| bag.string("email"))
                .unwrap_or_default();
            respond(
                AuthService::new(db, &state.config.auth)
                    .send_temporary_password(&input)
                    .await?,
            )
        }
        Action::GetAllProjects => data_envelope(&ProjectService::new(db).list_all().await?),
        Action::GetActiveProjects => data_envelope(&ProjectService::new(db).list_active().await?),
        Action::UpdateProjectInfo => {
            let ctx = current(ctx.as_ref())?;
            let payload = bag.deserialize()?;
            respond(
                ProjectService::new(db)
                    .update_info(ctx.operator(), payload)
                    .await?,
            )
        }
        Action::GetUnfilledProjectsForTomorrow => {
            data_envelope(&ReportService::new(db).unfilled_for_tomorrow().await?)
        }
        Action::SubmitDailyLog => {
            let operator = ctx.as_ref().map(AuthContext::operator);
            let payload = bag.deserialize()?;
            respond(DailyLogService::new(db).submit(operator, payload).await?)
        }
        Action::GetLastLogForProject => {
            let seq_no = bag.require_string("projectSeqNo")?;
            data_envelope(
                &DailyLogService::new(db)
                    .last_log_for_project(seq_no.trim())
                    .await?,
            )
        }
        Action::GetDailySummaryReport => {
            let request = SummaryRequest {
                date_string: bag.require_string("dateString")?,
                filter_status: bag.string("filterStatus"),
                filter_dept: bag.string("filterDept"),
                filter_inspector: bag.string("filterInspector"),
                viewer: summary_viewer(bag, ctx.as_ref()),
            };
            data_envelope(&ReportService::new(db).daily_summary(&request).await?)
        }
        Action::UpdateDailySummaryLog => {
            let ctx = current(ctx.as_ref())?;
            let payload = bag.deserialize()?;
            respond(
                DailyLogService::new(db)
                    .update_summary_log(ctx.operator(), payload)
                    .await?,
            )
        }
        Action::GetPreviousDayLog => {
            let seq_no = bag.require_string("projectSeqNo")?;
            let current_date = bag.require_string("currentDate")?;
            data_envelope(
                &DailyLogService::new(db)
                    .previous_day_log(seq_no.trim(), &current_date)
                    .await?,
            )
        }
        Action::GetUnfilledCount => data_envelope(&ReportService::new(db).unfilled_count().await?),
        Action::GetFilledDates => data_envelope(&ReportService::new(db).filled_dates().await?),
        Action::GetDailyLogStatus => {
            data_envelope(&ReportService::new(db).daily_log_status().await?)
        }
        Action::GetFillerReminders => {
            let ctx = current(ctx.as_ref())?;
            // 未带参数时以会话中自己的负责工程为准
            let managed = match bag.string("managedProjects") {
                Some(value) => value,
                None => serde_json::to_string(&ctx.user.get_managed_projects().unwrap_or_default())?,
            };
            data_envelope(&ReportService::new(db).filler_reminders(&managed).await?)
        }
        Action::GetAllInspectors => data_envelope(&InspectorService::new(db).list_all().await?),
        Action::AddInspector => respond(InspectorService::new(db).create(bag.deserialize()?).await?),
        Action::UpdateInspector => {
            respond(InspectorService::new(db).update(bag.deserialize()?).await?)
        }
        Action::CheckHolidayFilledStatus => {
            let date_string = bag.require_string("dateString")?;
            let seq_nos: Vec<String> = bag.json_field("projectSeqNos")?.unwrap_or_default();
            data_envelope(
                &HolidayService::new(db)
                    .filled_status(&date_string, &seq_nos)
                    .await?,
            )
        }
        Action::BatchSubmitHolidayLogs => {
            let ctx = current(ctx.as_ref())?;
            let start_date = bag.require_string("startDate")?;
            let end_date = bag.require_string("endDate")?;
            let target_days: Vec<u8> = bag.require_json_field("targetDays")?;
            let seq_nos: Vec<String> = bag.require_json_field("projectSeqNos")?;
            respond(
                HolidayService::new(db)
                    .batch_submit(ctx.operator(), &start_date, &end_date, &target_days, &seq_nos)
                    .await?,
            )
        }
        Action::CheckHoliday => {
            let date_string = bag.require_string("dateString")?;
            data_envelope(&HolidayService::new(db).check_holiday(&date_string).await?)
        }
        Action::GetMonthHolidays => {
            let year = require_i32(bag, "year")?;
            let month = u32::try_from(require_integer(bag, "month")?)
                .map_err(|_| SiteLogError::validation_field("参数 month 超出范围", "month"))?;
            data_envelope(&HolidayService::new(db).month_holidays(year, month).await?)
        }
        Action::GetAllDepartments => {
            data_envelope(&ProjectService::new(db).list_departments().await?)
        }
        Action::GetDisasterTypes => {
            data_envelope(&DisasterTypeService::new(db).list_grouped().await?)
        }
        Action::SaveCustomDisasterType => {
            let custom = bag.string("customType").unwrap_or_default();
            respond(DisasterTypeService::new(db).save_custom(&custom).await?)
        }
        Action::GenerateTbmKy => {
            let request = TbmRequest {
                date_string: bag.require_string("dateString")?,
                project_seq_no: bag.require_string("projectSeqNo")?,
                mode: bag.string("mode"),
            };
            respond(TbmService::new(db, &state.config.tbm).generate(request).await?)
        }
        Action::TestTbmKyPermissions => {
            respond(TbmService::new(db, &state.config.tbm).test_permissions()?)
        }
        Action::LogModification => {
            let ctx = current(ctx.as_ref())?;
            let entry = ModificationEntry {
                log_type: bag.require_string("logType")?,
                project_seq_no: bag.string("projectSeqNo"),
                old_data: bag.raw("oldData").cloned(),
                new_data: bag.raw("newData").cloned(),
                reason: bag.string("reason"),
                action_type: bag.require_string("actionType")?,
                operator: ctx.operator().to_string(),
            };
            respond(ModificationLogService::new(db).append(entry).await?)
        }
    }
}

/// 授权检查已保证会话存在，此处仅为类型收窄
fn current(ctx: Option<&AuthContext>) -> Result<&AuthContext> {
    ctx.ok_or_else(|| crate::auth_error!(MSG_LOGIN_REQUIRED))
}

/// `userData` 物件优先，旧版呼叫把字段摊平在参数顶层
fn user_payload(bag: &ParamBag) -> Result<UserPayload> {
    match bag.json_field::<UserPayload>("userData")? {
        Some(payload) => Ok(payload),
        None => bag.deserialize(),
    }
}

fn summary_viewer(bag: &ParamBag, ctx: Option<&AuthContext>) -> SummaryViewer {
    match ctx {
        None => SummaryViewer {
            is_guest: true,
            is_admin: false,
            managed_projects: None,
        },
        Some(ctx) => {
            let unrestricted = ctx.is_admin() || ctx.is_liaison();
            SummaryViewer {
                is_guest: bag.boolean("isGuestMode").unwrap_or(false),
                is_admin: ctx.is_admin(),
                managed_projects: if unrestricted {
                    None
                } else {
                    Some(ctx.user.get_managed_projects().unwrap_or_default())
                },
            }
        }
    }
}

fn require_integer(bag: &ParamBag, key: &str) -> Result<i64> {
    bag.integer(key)
        .ok_or_else(|| SiteLogError::validation_field(format!("缺少必要参数: {key}"), key))
}

fn require_i32(bag: &ParamBag, key: &str) -> Result<i32> {
    i32::try_from(require_integer(bag, key)?)
        .map_err(|_| SiteLogError::validation_field(format!("参数 {key} 超出范围"), key))
}

fn respond<T: Serialize>(response: ServiceResponse<T>) -> Result<ApiEnvelope> {
    let data = serde_json::to_value(&response.data)?;
    Ok(match response.message {
        Some(message) => ApiEnvelope::ok_with_message(data, message),
        None => ApiEnvelope::ok(data),
    })
}

fn message_envelope(response: ServiceResponse<()>) -> ApiEnvelope {
    match response.message {
        Some(message) => ApiEnvelope::ok_message(message),
        None => ApiEnvelope::ok(Value::Null),
    }
}

fn data_envelope<T: Serialize>(value: &T) -> Result<ApiEnvelope> {
    Ok(ApiEnvelope::ok(serde_json::to_value(value)?))
}
