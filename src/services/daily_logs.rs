//! # 每日填报服务
//!
//! 填报提交采 (工程, 日期) 覆盖式更新:同一天重复提交以新内容整笔取代旧内容。
//! 假日不施工的填报强制清空工作项目并将出工人数归零。

use chrono::Utc;
use entity::{
    daily_logs, daily_logs::Entity as DailyLogs, log_work_items,
    log_work_items::Entity as LogWorkItems,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{Context, Result, SiteLogError};

use super::modification_logs::{ModificationEntry, ModificationLogService};
use super::projects::ProjectService;
use super::shared::{ServiceResponse, parse_date, parse_id_list};

/// 填报提交载荷
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDailyLogPayload {
    pub log_date: String,
    pub project_seq_no: String,
    #[serde(default)]
    pub is_holiday_no_work: bool,
    #[serde(default)]
    pub is_holiday_work: bool,
    pub inspector_ids: Option<Value>,
    pub workers_count: Option<Value>,
    #[serde(default)]
    pub work_items: Vec<WorkItemData>,
}

/// 单项工作内容，提交与回读共用同一形状
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemData {
    #[serde(default)]
    pub work_item: String,
    #[serde(default)]
    pub work_location: Option<String>,
    #[serde(default)]
    pub disaster_types: Vec<String>,
    #[serde(default)]
    pub countermeasures: Option<String>,
}

/// 填报响应
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogView {
    pub id: i32,
    pub project_seq_no: String,
    pub log_date: String,
    pub is_holiday_no_work: bool,
    pub is_holiday_work: bool,
    pub inspector_ids: Vec<i32>,
    pub workers_count: i32,
    pub work_items: Vec<WorkItemData>,
    pub created_by: Option<String>,
    pub updated_at: String,
}

/// 汇总表编辑载荷，限管理员与联络员
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummaryPayload {
    pub project_seq_no: String,
    pub log_date: String,
    pub workers_count: Option<Value>,
    pub inspector_ids: Option<Value>,
    pub work_items: Option<Vec<WorkItemData>>,
    pub is_holiday_no_work: Option<bool>,
    pub is_holiday_work: Option<bool>,
    pub reason: Option<String>,
}

/// 每日填报服务
pub struct DailyLogService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DailyLogService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 提交填报，(工程, 日期) 已有资料时整笔覆盖
    pub async fn submit(
        &self,
        operator: Option<&str>,
        payload: SubmitDailyLogPayload,
    ) -> Result<ServiceResponse<DailyLogView>> {
        let log_date = parse_date(&payload.log_date, "logDate")?;
        let project = ProjectService::new(self.db)
            .get_by_seq_no(payload.project_seq_no.trim())
            .await?;

        if payload.is_holiday_no_work && payload.is_holiday_work {
            return Err(SiteLogError::validation(
                "假日不施工與假日有施工不可同時勾選",
            ));
        }

        let inspector_ids = match payload.inspector_ids.as_ref() {
            Some(raw) => parse_id_list(raw, "inspectorIds")?,
            None => Vec::new(),
        };
        let (workers_count, work_items) = if payload.is_holiday_no_work {
            // 假日不施工:不计出工、不留工作项目
            (0, Vec::new())
        } else {
            let items: Vec<WorkItemData> = payload
                .work_items
                .into_iter()
                .filter(|item| !item.work_item.trim().is_empty())
                .collect();
            if items.is_empty() {
                return Err(SiteLogError::business("請至少填寫一項工作項目"));
            }
            (parse_workers_count(payload.workers_count.as_ref())?, items)
        };

        let existing = self
            .find_log(&project.seq_no, log_date)
            .await?;
        let now = Utc::now().naive_utc();
        let encoded_ids = encode_ids(&inspector_ids)?;

        let txn = self.db.begin().await.context("Failed to begin transaction")?;
        let (log_id, replaced) = match existing {
            Some(log) => {
                LogWorkItems::delete_many()
                    .filter(log_work_items::Column::DailyLogId.eq(log.id))
                    .exec(&txn)
                    .await
                    .context("Failed to clear old work items")?;
                let log_id = log.id;
                let mut active: daily_logs::ActiveModel = log.into();
                active.is_holiday_no_work = Set(payload.is_holiday_no_work);
                active.is_holiday_work = Set(payload.is_holiday_work);
                active.inspector_ids = Set(encoded_ids);
                active.workers_count = Set(workers_count);
                active.created_by = Set(operator.map(ToString::to_string));
                active.updated_at = Set(now);
                active
                    .update(&txn)
                    .await
                    .context("Failed to overwrite daily log")?;
                (log_id, true)
            }
            None => {
                let model = daily_logs::ActiveModel {
                    project_seq_no: Set(project.seq_no.clone()),
                    log_date: Set(log_date),
                    is_holiday_no_work: Set(payload.is_holiday_no_work),
                    is_holiday_work: Set(payload.is_holiday_work),
                    inspector_ids: Set(encoded_ids),
                    workers_count: Set(workers_count),
                    created_by: Set(operator.map(ToString::to_string)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                let inserted = DailyLogs::insert(model)
                    .exec(&txn)
                    .await
                    .context("Failed to insert daily log")?;
                (inserted.last_insert_id, false)
            }
        };
        insert_work_items(&txn, log_id, &work_items).await?;
        txn.commit().await.context("Failed to commit daily log")?;

        info!(project = %project.seq_no, date = %payload.log_date, replaced, "填報已保存");
        let view = self.fetch_view(log_id).await?;
        let message = if replaced { "填報已更新" } else { "填報成功" };
        Ok(ServiceResponse::with_message(view, message))
    }

    /// 工程最近一次填报
    pub async fn last_log_for_project(&self, seq_no: &str) -> Result<Option<DailyLogView>> {
        let log = DailyLogs::find()
            .filter(daily_logs::Column::ProjectSeqNo.eq(seq_no))
            .order_by_desc(daily_logs::Column::LogDate)
            .one(self.db)
            .await
            .context("Failed to query last log")?;
        match log {
            Some(log) => Ok(Some(self.build_view(log).await?)),
            None => Ok(None),
        }
    }

    /// 指定日期之前最近的一次填报，作为次日表单的带入模板
    pub async fn previous_day_log(
        &self,
        seq_no: &str,
        current_date: &str,
    ) -> Result<Option<DailyLogView>> {
        let date = parse_date(current_date, "currentDate")?;
        let log = DailyLogs::find()
            .filter(daily_logs::Column::ProjectSeqNo.eq(seq_no))
            .filter(daily_logs::Column::LogDate.lt(date))
            .order_by_desc(daily_logs::Column::LogDate)
            .one(self.db)
            .await
            .context("Failed to query previous day log")?;
        match log {
            Some(log) => Ok(Some(self.build_view(log).await?)),
            None => Ok(None),
        }
    }

    /// 汇总表就地编辑，必附修改轨迹
    pub async fn update_summary_log(
        &self,
        operator: &str,
        payload: UpdateSummaryPayload,
    ) -> Result<ServiceResponse<DailyLogView>> {
        let log_date = parse_date(&payload.log_date, "logDate")?;
        let log = self
            .find_log(payload.project_seq_no.trim(), log_date)
            .await?
            .ok_or_else(|| SiteLogError::business("該日期尚無填報資料，無法編輯"))?;
        let old_view = self.build_view(log.clone()).await?;

        let final_no_work = payload.is_holiday_no_work.unwrap_or(log.is_holiday_no_work);
        let final_holiday_work = payload.is_holiday_work.unwrap_or(log.is_holiday_work);
        if final_no_work && final_holiday_work {
            return Err(SiteLogError::validation(
                "假日不施工與假日有施工不可同時勾選",
            ));
        }
        let workers_count = if final_no_work {
            0
        } else {
            match payload.workers_count.as_ref() {
                Some(raw) => parse_workers_count(Some(raw))?,
                None => log.workers_count,
            }
        };

        let txn = self.db.begin().await.context("Failed to begin transaction")?;
        let log_id = log.id;
        let mut active: daily_logs::ActiveModel = log.into();
        active.is_holiday_no_work = Set(final_no_work);
        active.is_holiday_work = Set(final_holiday_work);
        active.workers_count = Set(workers_count);
        if let Some(raw) = payload.inspector_ids.as_ref() {
            let ids = parse_id_list(raw, "inspectorIds")?;
            active.inspector_ids = Set(encode_ids(&ids)?);
        }
        active.updated_at = Set(Utc::now().naive_utc());
        active
            .update(&txn)
            .await
            .context("Failed to update daily log")?;

        // 改为不施工或明确给出新项目列表时重建工作项目
        if final_no_work || payload.work_items.is_some() {
            LogWorkItems::delete_many()
                .filter(log_work_items::Column::DailyLogId.eq(log_id))
                .exec(&txn)
                .await
                .context("Failed to clear old work items")?;
            if !final_no_work {
                let items: Vec<WorkItemData> = payload
                    .work_items
                    .iter()
                    .flatten()
                    .filter(|item| !item.work_item.trim().is_empty())
                    .cloned()
                    .collect();
                if items.is_empty() {
                    return Err(SiteLogError::business("請至少填寫一項工作項目"));
                }
                insert_work_items(&txn, log_id, &items).await?;
            }
        }
        txn.commit().await.context("Failed to commit summary edit")?;

        let new_view = self.fetch_view(log_id).await?;
        let reason = payload
            .reason
            .clone()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "管理員修改".to_string());
        ModificationLogService::new(self.db)
            .append(ModificationEntry {
                log_type: "daily_log".to_string(),
                project_seq_no: Some(new_view.project_seq_no.clone()),
                old_data: Some(serde_json::to_value(&old_view).unwrap_or(Value::Null)),
                new_data: Some(serde_json::to_value(&new_view).unwrap_or(Value::Null)),
                reason: Some(reason),
                action_type: "update".to_string(),
                operator: operator.to_string(),
            })
            .await?;

        info!(project = %new_view.project_seq_no, date = %new_view.log_date, "汇总表编辑完成");
        Ok(ServiceResponse::with_message(new_view, "填報資料更新成功"))
    }

    async fn find_log(
        &self,
        seq_no: &str,
        log_date: chrono::NaiveDate,
    ) -> Result<Option<daily_logs::Model>> {
        DailyLogs::find()
            .filter(daily_logs::Column::ProjectSeqNo.eq(seq_no))
            .filter(daily_logs::Column::LogDate.eq(log_date))
            .one(self.db)
            .await
            .context("Failed to query daily log")
    }

    async fn fetch_view(&self, log_id: i32) -> Result<DailyLogView> {
        let log = DailyLogs::find_by_id(log_id)
            .one(self.db)
            .await
            .context("Failed to fetch daily log")?
            .ok_or_else(|| SiteLogError::not_found("填報", log_id.to_string()))?;
        self.build_view(log).await
    }

    pub(crate) async fn build_view(&self, log: daily_logs::Model) -> Result<DailyLogView> {
        let items = LogWorkItems::find()
            .filter(log_work_items::Column::DailyLogId.eq(log.id))
            .order_by_asc(log_work_items::Column::SortOrder)
            .all(self.db)
            .await
            .context("Failed to fetch work items")?;
        build_log_view(&log, &items)
    }
}

/// 由主表列与工作项目列组装响应
pub(crate) fn build_log_view(
    log: &daily_logs::Model,
    items: &[log_work_items::Model],
) -> Result<DailyLogView> {
    let inspector_ids = log
        .get_inspector_ids()
        .map_err(|e| SiteLogError::serialization("监工编号解析失败", e.into()))?;
    let mut work_items = Vec::with_capacity(items.len());
    for item in items {
        let disaster_types = item
            .get_disaster_types()
            .map_err(|e| SiteLogError::serialization("灾害类型解析失败", e.into()))?;
        work_items.push(WorkItemData {
            work_item: item.work_item.clone(),
            work_location: item.work_location.clone(),
            disaster_types,
            countermeasures: item.countermeasures.clone(),
        });
    }
    Ok(DailyLogView {
        id: log.id,
        project_seq_no: log.project_seq_no.clone(),
        log_date: log.log_date.format("%Y-%m-%d").to_string(),
        is_holiday_no_work: log.is_holiday_no_work,
        is_holiday_work: log.is_holiday_work,
        inspector_ids,
        workers_count: log.workers_count,
        work_items,
        created_by: log.created_by.clone(),
        updated_at: log.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

async fn insert_work_items(
    txn: &sea_orm::DatabaseTransaction,
    log_id: i32,
    items: &[WorkItemData],
) -> Result<()> {
    for (index, item) in items.iter().enumerate() {
        let sort_order = i32::try_from(index).unwrap_or(i32::MAX);
        let model = log_work_items::ActiveModel {
            daily_log_id: Set(log_id),
            sort_order: Set(sort_order),
            work_item: Set(item.work_item.trim().to_string()),
            work_location: Set(item
                .work_location
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)),
            disaster_types: Set(encode_disaster_types(&item.disaster_types)?),
            countermeasures: Set(item
                .countermeasures
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)),
            ..Default::default()
        };
        LogWorkItems::insert(model)
            .exec(txn)
            .await
            .context("Failed to insert work item")?;
    }
    Ok(())
}

fn encode_ids(ids: &[i32]) -> Result<Option<String>> {
    if ids.is_empty() {
        return Ok(None);
    }
    let encoded = serde_json::to_string(ids)
        .map_err(|e| SiteLogError::serialization("监工编号序列化失败", e.into()))?;
    Ok(Some(encoded))
}

fn encode_disaster_types(types: &[String]) -> Result<Option<String>> {
    let cleaned: Vec<&str> = types
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    let encoded = serde_json::to_string(&cleaned)
        .map_err(|e| SiteLogError::serialization("灾害类型序列化失败", e.into()))?;
    Ok(Some(encoded))
}

fn parse_workers_count(raw: Option<&Value>) -> Result<i32> {
    let count = match raw {
        None | Some(Value::Null) => 0,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(-1),
        Some(Value::String(s)) if s.trim().is_empty() => 0,
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(-1),
        Some(_) => -1,
    };
    if !(0..=100_000).contains(&count) {
        return Err(SiteLogError::validation_field(
            "出工人數必須為非負整數",
            "workersCount",
        ));
    }
    i32::try_from(count)
        .map_err(|_| SiteLogError::validation_field("出工人數超出範圍", "workersCount"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_workers_count() {
        assert_eq!(parse_workers_count(None).unwrap(), 0);
        assert_eq!(parse_workers_count(Some(&json!(12))).unwrap(), 12);
        assert_eq!(parse_workers_count(Some(&json!("7"))).unwrap(), 7);
        assert_eq!(parse_workers_count(Some(&json!(""))).unwrap(), 0);
        assert!(parse_workers_count(Some(&json!(-3))).is_err());
        assert!(parse_workers_count(Some(&json!("abc"))).is_err());
    }

    #[test]
    fn test_encode_disaster_types_drops_blanks() {
        let types = vec!["墜落".to_string(), "  ".to_string(), "感電".to_string()];
        assert_eq!(
            encode_disaster_types(&types).unwrap(),
            Some(r#"["墜落","感電"]"#.to_string())
        );
        assert_eq!(encode_disaster_types(&[]).unwrap(), None);
    }

    #[test]
    fn test_submit_payload_deserializes_camel_case() {
        let payload: SubmitDailyLogPayload = serde_json::from_value(json!({
            "logDate": "2024-06-14",
            "projectSeqNo": "P001",
            "isHolidayNoWork": false,
            "isHolidayWork": false,
            "inspectorIds": [1, 2],
            "workersCount": 8,
            "workItems": [{
                "workItem": "基礎開挖",
                "workLocation": "A 區",
                "disasterTypes": ["墜落"],
                "countermeasures": "設置護欄"
            }]
        }))
        .unwrap();
        assert_eq!(payload.project_seq_no, "P001");
        assert_eq!(payload.work_items.len(), 1);
        assert_eq!(payload.work_items[0].disaster_types, vec!["墜落"]);
    }
}
