//! # 假日行事历服务
//!
//! 有效假日判定:行事历有明确列时以列为准，否则周六日视为假日。
//! 批次假日填报对 (工程, 日期) 只补缺不覆盖，重复执行不产生新资料。

use chrono::{Datelike, NaiveDate, Utc};
use entity::{
    daily_logs, daily_logs::Entity as DailyLogs, holidays, holidays::Entity as Holidays,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::error::{Context, Result, SiteLogError};

use super::projects::ProjectService;
use super::shared::{ServiceResponse, parse_date};

/// 单日假日判定结果
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HolidayInfo {
    pub date: String,
    pub is_holiday: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    pub is_weekend: bool,
}

/// 月历中的一天
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MonthDayInfo {
    pub is_holiday: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// 指定日期单一工程的填报状况
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilledStatus {
    pub project_seq_no: String,
    pub filled: bool,
    pub is_holiday_no_work: bool,
}

/// 批次假日填报结果
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BatchHolidayOutcome {
    pub created: u32,
    pub skipped: u32,
    pub holidays_marked: u32,
}

/// 假日行事历服务
pub struct HolidayService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> HolidayService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 查询单日有效假日信息
    pub async fn check_holiday(&self, date_string: &str) -> Result<HolidayInfo> {
        let date = parse_date(date_string, "dateString")?;
        let explicit = self.find_explicit(date).await?;
        Ok(effective_holiday(date, explicit.as_ref()))
    }

    /// 整月假日地图，逐日带出有效判定
    pub async fn month_holidays(
        &self,
        year: i32,
        month: u32,
    ) -> Result<BTreeMap<String, MonthDayInfo>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| SiteLogError::validation("年月參數無效"))?;
        let rows = Holidays::find()
            .filter(holidays::Column::HolidayDate.gte(first))
            .filter(holidays::Column::HolidayDate.lt(next_month(first)))
            .all(self.db)
            .await
            .context("Failed to list month holidays")?;
        let by_date: BTreeMap<NaiveDate, &holidays::Model> =
            rows.iter().map(|r| (r.holiday_date, r)).collect();

        let mut map = BTreeMap::new();
        let mut day = first;
        while day.month() == month {
            let info = effective_holiday(day, by_date.get(&day).copied());
            map.insert(
                day.format("%Y-%m-%d").to_string(),
                MonthDayInfo {
                    is_holiday: info.is_holiday,
                    remark: info.remark,
                },
            );
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        Ok(map)
    }

    /// 指定日期、指定工程的填报状况
    pub async fn filled_status(
        &self,
        date_string: &str,
        project_seq_nos: &[String],
    ) -> Result<Vec<ProjectFilledStatus>> {
        let date = parse_date(date_string, "dateString")?;
        let logs = DailyLogs::find()
            .filter(daily_logs::Column::LogDate.eq(date))
            .filter(daily_logs::Column::ProjectSeqNo.is_in(project_seq_nos.iter().cloned()))
            .all(self.db)
            .await
            .context("Failed to query filled status")?;

        Ok(project_seq_nos
            .iter()
            .map(|seq_no| {
                let log = logs.iter().find(|l| &l.project_seq_no == seq_no);
                ProjectFilledStatus {
                    project_seq_no: seq_no.clone(),
                    filled: log.is_some(),
                    is_holiday_no_work: log.is_some_and(|l| l.is_holiday_no_work),
                }
            })
            .collect())
    }

    /// 批次建立假日不施工填报
    ///
    /// 范围内周别命中 `target_days` (0=周日 ... 6=周六) 的每一天、每个列出的工程,
    /// 没有填报列才补一笔,已有任何填报一律略过。
    pub async fn batch_submit(
        &self,
        operator: &str,
        start_date: &str,
        end_date: &str,
        target_days: &[u8],
        project_seq_nos: &[String],
    ) -> Result<ServiceResponse<BatchHolidayOutcome>> {
        let start = parse_date(start_date, "startDate")?;
        let end = parse_date(end_date, "endDate")?;
        crate::ensure_validation!(start <= end, "開始日期不可晚於結束日期");
        crate::ensure_validation!((end - start).num_days() <= 366, "日期範圍不可超過一年");
        for day in target_days {
            if *day > 6 {
                return Err(SiteLogError::validation_field(
                    "targetDays 只接受 0 到 6",
                    "targetDays",
                ));
            }
        }
        let project_service = ProjectService::new(self.db);
        for seq_no in project_seq_nos {
            project_service.get_by_seq_no(seq_no).await?;
        }

        let matching_dates = collect_matching_dates(start, end, target_days);
        let now = Utc::now().naive_utc();
        let mut outcome = BatchHolidayOutcome {
            created: 0,
            skipped: 0,
            holidays_marked: 0,
        };

        let txn = self.db.begin().await.context("Failed to begin transaction")?;
        for date in &matching_dates {
            if self.mark_holiday(&txn, *date, now).await? {
                outcome.holidays_marked += 1;
            }
            for seq_no in project_seq_nos {
                let existing = DailyLogs::find()
                    .filter(daily_logs::Column::ProjectSeqNo.eq(seq_no))
                    .filter(daily_logs::Column::LogDate.eq(*date))
                    .one(&txn)
                    .await
                    .context("Failed to query existing log")?;
                if existing.is_some() {
                    outcome.skipped += 1;
                    continue;
                }
                let model = daily_logs::ActiveModel {
                    project_seq_no: Set(seq_no.clone()),
                    log_date: Set(*date),
                    is_holiday_no_work: Set(true),
                    is_holiday_work: Set(false),
                    inspector_ids: Set(None),
                    workers_count: Set(0),
                    created_by: Set(Some(operator.to_string())),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                DailyLogs::insert(model)
                    .exec(&txn)
                    .await
                    .context("Failed to insert holiday log")?;
                outcome.created += 1;
            }
        }
        txn.commit().await.context("Failed to commit holiday batch")?;

        info!(
            created = outcome.created,
            skipped = outcome.skipped,
            marked = outcome.holidays_marked,
            "批次假日填報完成"
        );
        let message = format!(
            "已建立 {} 筆假日填報，略過 {} 筆",
            outcome.created, outcome.skipped
        );
        Ok(ServiceResponse::with_message(outcome, message))
    }

    async fn find_explicit(&self, date: NaiveDate) -> Result<Option<holidays::Model>> {
        Holidays::find()
            .filter(holidays::Column::HolidayDate.eq(date))
            .one(self.db)
            .await
            .context("Failed to query holiday row")
    }

    /// 将日期标记为假日，已标记时不动作;回传是否有写入
    async fn mark_holiday(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        date: NaiveDate,
        now: chrono::NaiveDateTime,
    ) -> Result<bool> {
        let existing = Holidays::find()
            .filter(holidays::Column::HolidayDate.eq(date))
            .one(txn)
            .await
            .context("Failed to query holiday row")?;
        match existing {
            Some(row) if row.is_holiday => Ok(false),
            Some(row) => {
                let mut active: holidays::ActiveModel = row.into();
                active.is_holiday = Set(true);
                active.remark = Set(Some("假日不施工".to_string()));
                active.updated_at = Set(now);
                active
                    .update(txn)
                    .await
                    .context("Failed to update holiday row")?;
                Ok(true)
            }
            None => {
                let model = holidays::ActiveModel {
                    holiday_date: Set(date),
                    is_holiday: Set(true),
                    remark: Set(Some("假日不施工".to_string())),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                Holidays::insert(model)
                    .exec(txn)
                    .await
                    .context("Failed to insert holiday row")?;
                Ok(true)
            }
        }
    }
}

/// 有效假日:明确列优先，否则周六日回传「週末」
pub(crate) fn effective_holiday(date: NaiveDate, explicit: Option<&holidays::Model>) -> HolidayInfo {
    let weekday = date.weekday().num_days_from_sunday();
    let is_weekend = weekday == 0 || weekday == 6;
    match explicit {
        Some(row) => HolidayInfo {
            date: date.format("%Y-%m-%d").to_string(),
            is_holiday: row.is_holiday,
            remark: row.remark.clone(),
            is_weekend,
        },
        None => HolidayInfo {
            date: date.format("%Y-%m-%d").to_string(),
            is_holiday: is_weekend,
            remark: is_weekend.then(|| "週末".to_string()),
            is_weekend,
        },
    }
}

fn collect_matching_dates(start: NaiveDate, end: NaiveDate, target_days: &[u8]) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut day = start;
    while day <= end {
        let weekday = u8::try_from(day.weekday().num_days_from_sunday()).unwrap_or(7);
        if target_days.contains(&weekday) {
            dates.push(day);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    dates
}

fn next_month(first: NaiveDate) -> NaiveDate {
    if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1).unwrap_or(first)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1).unwrap_or(first)
    }
}
