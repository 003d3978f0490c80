//! # 报表汇总服务
//!
//! 跨表汇整的只读视图:明日未填报清单、单日汇总表、已填报日期、
//! 填表人提醒。访客视角会遮罩联络电话，非管理员只看得到自己负责的工程。

use chrono::Local;
use entity::{
    daily_logs, daily_logs::Entity as DailyLogs, log_work_items,
    log_work_items::Entity as LogWorkItems,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::{Context, Result, SiteLogError};

use super::daily_logs::WorkItemData;
use super::holidays::HolidayService;
use super::inspectors::InspectorService;
use super::projects::ProjectService;

/// 明日未填报清单
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UnfilledReport {
    pub date: String,
    pub is_holiday: bool,
    pub projects: Vec<UnfilledProjectRow>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UnfilledProjectRow {
    pub project_seq_no: String,
    pub project_name: String,
    pub contractor: Option<String>,
    pub dept: Option<String>,
}

/// 未填报数量
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UnfilledCount {
    pub date: String,
    pub count: u32,
}

/// 汇总表的查询视角
#[derive(Debug, Clone, Default)]
pub struct SummaryViewer {
    pub is_guest: bool,
    pub is_admin: bool,
    pub managed_projects: Option<Vec<String>>,
}

/// 汇总表查询条件
#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    pub date_string: String,
    pub filter_status: Option<String>,
    pub filter_dept: Option<String>,
    pub filter_inspector: Option<String>,
    pub viewer: SummaryViewer,
}

/// 单日汇总表
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub date: String,
    pub is_holiday: bool,
    pub rows: Vec<SummaryRow>,
    pub totals: SummaryTotals,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub project_seq_no: String,
    pub project_name: String,
    pub full_name: Option<String>,
    pub contractor: Option<String>,
    pub dept: Option<String>,
    pub project_status: String,
    pub resp: Option<String>,
    pub resp_phone: Option<String>,
    pub safety_officer: Option<String>,
    pub safety_phone: Option<String>,
    pub safety_license: Option<String>,
    pub filled: bool,
    pub is_holiday_no_work: bool,
    pub is_holiday_work: bool,
    pub workers_count: i32,
    pub inspectors: Vec<String>,
    pub work_items: Vec<WorkItemData>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTotals {
    pub projects: u32,
    pub filled: u32,
    pub unfilled: u32,
    pub workers: i64,
}

/// 单一日期的填报工程列表
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FilledDate {
    pub date: String,
    pub project_seq_nos: Vec<String>,
}

/// 单一工程的填报日历状态
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLogStatus {
    pub project_seq_no: String,
    pub project_name: String,
    pub filled_dates: Vec<String>,
    pub today_filled: bool,
}

/// 报表服务
pub struct ReportService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReportService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 明日未填报的施工中工程
    ///
    /// 已有任何填报列 (含批次假日列) 的工程不再出现在清单中。
    pub async fn unfilled_for_tomorrow(&self) -> Result<UnfilledReport> {
        let tomorrow = Local::now()
            .date_naive()
            .succ_opt()
            .ok_or_else(|| crate::internal_error!("无法计算明日日期"))?;
        let date_string = tomorrow.format("%Y-%m-%d").to_string();

        let active = ProjectService::new(self.db).list_active().await?;
        let logged: Vec<String> = DailyLogs::find()
            .filter(daily_logs::Column::LogDate.eq(tomorrow))
            .all(self.db)
            .await
            .context("Failed to query tomorrow logs")?
            .into_iter()
            .map(|log| log.project_seq_no)
            .collect();

        let projects = active
            .into_iter()
            .filter(|p| !logged.contains(&p.seq_no))
            .map(|p| UnfilledProjectRow {
                project_seq_no: p.seq_no,
                project_name: p.name,
                contractor: p.contractor,
                dept: p.dept,
            })
            .collect();
        let holiday = HolidayService::new(self.db).check_holiday(&date_string).await?;

        Ok(UnfilledReport {
            date: date_string,
            is_holiday: holiday.is_holiday,
            projects,
        })
    }

    /// 明日未填报数量
    pub async fn unfilled_count(&self) -> Result<UnfilledCount> {
        let report = self.unfilled_for_tomorrow().await?;
        Ok(UnfilledCount {
            date: report.date,
            count: u32::try_from(report.projects.len()).unwrap_or(u32::MAX),
        })
    }

    /// 单日汇总表
    ///
    /// 相同条件与相同底层资料下重复查询回传一致结果。
    pub async fn daily_summary(&self, request: &SummaryRequest) -> Result<SummaryReport> {
        let date = super::shared::parse_date(&request.date_string, "dateString")?;
        let date_string = date.format("%Y-%m-%d").to_string();

        let mut project_list = ProjectService::new(self.db).list_all().await?;
        if let Some(status) = non_blank(request.filter_status.as_deref()) {
            project_list.retain(|p| p.project_status == status);
        }
        if let Some(dept) = non_blank(request.filter_dept.as_deref()) {
            project_list.retain(|p| p.dept.as_deref() == Some(dept));
        }
        if !request.viewer.is_admin
            && !request.viewer.is_guest
            && let Some(managed) = request.viewer.managed_projects.as_ref()
        {
            project_list.retain(|p| managed.contains(&p.seq_no));
        }

        let logs = DailyLogs::find()
            .filter(daily_logs::Column::LogDate.eq(date))
            .all(self.db)
            .await
            .context("Failed to query logs for summary")?;
        let log_ids: Vec<i32> = logs.iter().map(|l| l.id).collect();
        let items = if log_ids.is_empty() {
            Vec::new()
        } else {
            LogWorkItems::find()
                .filter(log_work_items::Column::DailyLogId.is_in(log_ids))
                .order_by_asc(log_work_items::Column::SortOrder)
                .all(self.db)
                .await
                .context("Failed to query work items for summary")?
        };

        let mut inspector_ids: Vec<i32> = Vec::new();
        for log in &logs {
            for id in log.get_inspector_ids().unwrap_or_default() {
                if !inspector_ids.contains(&id) {
                    inspector_ids.push(id);
                }
            }
        }
        let inspector_names: HashMap<i32, String> = InspectorService::new(self.db)
            .find_by_ids(&inspector_ids)
            .await?
            .into_iter()
            .map(|i| (i.id, i.name))
            .collect();

        let mut rows = Vec::with_capacity(project_list.len());
        for project in project_list {
            let log = logs.iter().find(|l| l.project_seq_no == project.seq_no);
            let row = build_summary_row(&project, log, &items, &inspector_names, request.viewer.is_guest)?;
            rows.push(row);
        }
        if let Some(filter) = non_blank(request.filter_inspector.as_deref()) {
            let wanted_id = filter.parse::<i32>().ok();
            rows.retain(|row| {
                row.filled
                    && (row.inspectors.iter().any(|n| n == filter)
                        || wanted_id.is_some_and(|id| {
                            inspector_names.get(&id).is_some_and(|name| {
                                row.inspectors.contains(name)
                            })
                        }))
            });
        }

        let filled = u32::try_from(rows.iter().filter(|r| r.filled).count()).unwrap_or(u32::MAX);
        let total = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let workers: i64 = rows.iter().map(|r| i64::from(r.workers_count)).sum();
        let holiday = HolidayService::new(self.db).check_holiday(&date_string).await?;

        Ok(SummaryReport {
            date: date_string,
            is_holiday: holiday.is_holiday,
            rows,
            totals: SummaryTotals {
                projects: total,
                filled,
                unfilled: total.saturating_sub(filled),
                workers,
            },
        })
    }

    /// 至少有一笔填报的日期，升序，各带当日填报的工程序号
    pub async fn filled_dates(&self) -> Result<Vec<FilledDate>> {
        let logs = DailyLogs::find()
            .order_by_asc(daily_logs::Column::LogDate)
            .all(self.db)
            .await
            .context("Failed to list logs for filled dates")?;

        let mut grouped: BTreeMap<chrono::NaiveDate, Vec<String>> = BTreeMap::new();
        for log in logs {
            grouped.entry(log.log_date).or_default().push(log.project_seq_no);
        }
        Ok(grouped
            .into_iter()
            .map(|(date, mut seq_nos)| {
                seq_nos.sort();
                FilledDate {
                    date: date.format("%Y-%m-%d").to_string(),
                    project_seq_nos: seq_nos,
                }
            })
            .collect())
    }

    /// 各施工中工程的填报日历状态
    pub async fn daily_log_status(&self) -> Result<Vec<ProjectLogStatus>> {
        let today = Local::now().date_naive();
        let active = ProjectService::new(self.db).list_active().await?;
        let logs = DailyLogs::find()
            .order_by_asc(daily_logs::Column::LogDate)
            .all(self.db)
            .await
            .context("Failed to list logs for status")?;

        Ok(active
            .into_iter()
            .map(|project| {
                let filled_dates: Vec<String> = logs
                    .iter()
                    .filter(|l| l.project_seq_no == project.seq_no)
                    .map(|l| l.log_date.format("%Y-%m-%d").to_string())
                    .collect();
                let today_filled = logs
                    .iter()
                    .any(|l| l.project_seq_no == project.seq_no && l.log_date == today);
                ProjectLogStatus {
                    project_seq_no: project.seq_no,
                    project_name: project.name,
                    filled_dates,
                    today_filled,
                }
            })
            .collect())
    }

    /// 填表人提醒:负责工程与明日未填报清单的交集
    pub async fn filler_reminders(&self, managed_projects_str: &str) -> Result<UnfilledReport> {
        let managed = parse_managed_projects(managed_projects_str);
        let mut report = self.unfilled_for_tomorrow().await?;
        report
            .projects
            .retain(|p| managed.contains(&p.project_seq_no));
        Ok(report)
    }
}

fn build_summary_row(
    project: &super::projects::ProjectView,
    log: Option<&daily_logs::Model>,
    all_items: &[log_work_items::Model],
    inspector_names: &HashMap<i32, String>,
    guest_mode: bool,
) -> Result<SummaryRow> {
    let (filled, is_holiday_no_work, is_holiday_work, workers_count, inspectors, work_items) =
        match log {
            Some(log) => {
                let ids = log
                    .get_inspector_ids()
                    .map_err(|e| SiteLogError::serialization("监工编号解析失败", e.into()))?;
                let names = ids
                    .iter()
                    .filter_map(|id| inspector_names.get(id).cloned())
                    .collect();
                let mut items = Vec::new();
                for item in all_items.iter().filter(|i| i.daily_log_id == log.id) {
                    let disaster_types = item
                        .get_disaster_types()
                        .map_err(|e| SiteLogError::serialization("灾害类型解析失败", e.into()))?;
                    items.push(WorkItemData {
                        work_item: item.work_item.clone(),
                        work_location: item.work_location.clone(),
                        disaster_types,
                        countermeasures: item.countermeasures.clone(),
                    });
                }
                (
                    true,
                    log.is_holiday_no_work,
                    log.is_holiday_work,
                    log.workers_count,
                    names,
                    items,
                )
            }
            None => (false, false, false, 0, Vec::new(), Vec::new()),
        };

    // 访客视角不提供联络电话
    let (resp_phone, safety_phone) = if guest_mode {
        (None, None)
    } else {
        (project.resp_phone.clone(), project.safety_phone.clone())
    };

    Ok(SummaryRow {
        project_seq_no: project.seq_no.clone(),
        project_name: project.name.clone(),
        full_name: project.full_name.clone(),
        contractor: project.contractor.clone(),
        dept: project.dept.clone(),
        project_status: project.project_status.clone(),
        resp: project.resp.clone(),
        resp_phone,
        safety_officer: project.safety_officer.clone(),
        safety_phone,
        safety_license: project.safety_license.clone(),
        filled,
        is_holiday_no_work,
        is_holiday_work,
        workers_count,
        inspectors,
        work_items,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 负责工程参数兼容 JSON 数组与逗号分隔两种形态
fn parse_managed_projects(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
        return list;
    }
    trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_managed_projects_forms() {
        assert_eq!(
            parse_managed_projects(r#"["P001","P002"]"#),
            vec!["P001".to_string(), "P002".to_string()]
        );
        assert_eq!(
            parse_managed_projects("P001, P002"),
            vec!["P001".to_string(), "P002".to_string()]
        );
        assert_eq!(parse_managed_projects("P001"), vec!["P001".to_string()]);
        assert!(parse_managed_projects("  ").is_empty());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some(" 施工中 ")), Some("施工中"));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }
}
