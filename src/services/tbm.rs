//! # TBM-KY 文件产出服务
//!
//! 依指定工程与日期的填报内容产出工具箱会议暨危害预知 (TBM-KY) 试算表。
//! `merged` 模式一份文件列出全部监工，`separate` 模式每位监工各一份。

use chrono::Utc;
use entity::{
    daily_logs, daily_logs::Entity as DailyLogs, inspectors, log_work_items,
    log_work_items::Entity as LogWorkItems, projects,
};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::TbmConfig;
use crate::error::{Context, Result, SiteLogError};

use super::inspectors::InspectorService;
use super::projects::ProjectService;
use super::shared::{ServiceResponse, parse_date};

/// 文件产出请求
#[derive(Debug, Clone)]
pub struct TbmRequest {
    pub date_string: String,
    pub project_seq_no: String,
    pub mode: Option<String>,
}

/// 单份产出文件的存取信息
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TbmDocument {
    pub file_name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspector: Option<String>,
}

/// 文件产出结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TbmOutcome {
    pub mode: String,
    pub files: Vec<TbmDocument>,
}

/// 输出目录检测结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TbmProbeOutcome {
    pub path: String,
}

/// TBM-KY 文件服务
pub struct TbmService<'a> {
    db: &'a DatabaseConnection,
    config: &'a TbmConfig,
}

impl<'a> TbmService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection, config: &'a TbmConfig) -> Self {
        Self { db, config }
    }

    /// 产出指定日期的 TBM-KY 文件
    pub async fn generate(&self, request: TbmRequest) -> Result<ServiceResponse<TbmOutcome>> {
        let date = parse_date(&request.date_string, "dateString")?;
        let mode = match request.mode.as_deref().map(str::trim) {
            None | Some("") | Some("merged") => "merged",
            Some("separate") => "separate",
            Some(other) => {
                return Err(SiteLogError::validation(format!(
                    "無效的產出模式: {other}，僅接受 merged 或 separate"
                )));
            }
        };

        let project = ProjectService::new(self.db)
            .get_by_seq_no(request.project_seq_no.trim())
            .await?;
        let log = DailyLogs::find()
            .filter(daily_logs::Column::ProjectSeqNo.eq(project.seq_no.as_str()))
            .filter(daily_logs::Column::LogDate.eq(date))
            .one(self.db)
            .await
            .context("Failed to query daily log for TBM")?
            .ok_or_else(|| SiteLogError::business("該日期尚無填報資料，無法產出 TBM 文件"))?;
        if log.is_holiday_no_work {
            return Err(SiteLogError::business("假日不施工，無 TBM 文件可產出"));
        }
        let items = LogWorkItems::find()
            .filter(log_work_items::Column::DailyLogId.eq(log.id))
            .order_by_asc(log_work_items::Column::SortOrder)
            .all(self.db)
            .await
            .context("Failed to query work items for TBM")?;

        let inspector_ids = log
            .get_inspector_ids()
            .map_err(|e| SiteLogError::serialization("监工编号解析失败", e.into()))?;
        let inspectors = InspectorService::new(self.db).find_by_ids(&inspector_ids).await?;
        if mode == "separate" && inspectors.is_empty() {
            return Err(SiteLogError::business("該筆填報未指定監工，無法分開產出"));
        }

        let output_dir = self.ensure_output_dir()?;
        let date_string = date.format("%Y-%m-%d").to_string();
        let mut files = Vec::new();
        if mode == "merged" {
            let file_name = format!("TBM-KY_{}_{}.xlsx", project.seq_no, date_string);
            let path = output_dir.join(&file_name);
            render_document(&path, &project, &date_string, &log, &items, &inspectors)?;
            files.push(TbmDocument {
                file_name,
                path: path.to_string_lossy().into_owned(),
                inspector: None,
            });
        } else {
            for inspector in &inspectors {
                let file_name = format!(
                    "TBM-KY_{}_{}_{}.xlsx",
                    project.seq_no,
                    date_string,
                    sanitize_component(&inspector.name)
                );
                let path = output_dir.join(&file_name);
                render_document(
                    &path,
                    &project,
                    &date_string,
                    &log,
                    &items,
                    std::slice::from_ref(inspector),
                )?;
                files.push(TbmDocument {
                    file_name,
                    path: path.to_string_lossy().into_owned(),
                    inspector: Some(inspector.name.clone()),
                });
            }
        }

        info!(
            project = %project.seq_no,
            date = %date_string,
            mode,
            count = files.len(),
            "TBM-KY 文件已產出"
        );
        let message = format!("已產出 {} 份 TBM-KY 文件", files.len());
        Ok(ServiceResponse::with_message(
            TbmOutcome {
                mode: mode.to_string(),
                files,
            },
            message,
        ))
    }

    /// 检测输出目录是否可建立与写入
    pub fn test_permissions(&self) -> Result<ServiceResponse<TbmProbeOutcome>> {
        let output_dir = self.ensure_output_dir()?;
        let probe = output_dir.join(".write_probe");
        std::fs::write(&probe, Utc::now().to_rfc3339())
            .map_err(|e| SiteLogError::io("TBM 輸出目錄不可寫入", e))?;
        std::fs::remove_file(&probe).map_err(|e| SiteLogError::io("無法刪除測試文件", e))?;

        let resolved = std::fs::canonicalize(&output_dir)
            .unwrap_or(output_dir)
            .to_string_lossy()
            .into_owned();
        Ok(ServiceResponse::with_message(
            TbmProbeOutcome { path: resolved },
            "輸出目錄可正常寫入",
        ))
    }

    fn ensure_output_dir(&self) -> Result<PathBuf> {
        let dir = PathBuf::from(&self.config.output_dir);
        std::fs::create_dir_all(&dir)
            .map_err(|e| SiteLogError::io("無法建立 TBM 輸出目錄", e))?;
        Ok(dir)
    }
}

/// 单份文件版面:工程信息区块加上工作项目与危害对策表格
fn render_document(
    path: &Path,
    project: &projects::Model,
    date_string: &str,
    log: &daily_logs::Model,
    items: &[log_work_items::Model],
    inspectors: &[inspectors::Model],
) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("TBM-KY")?;

    let title_format = Format::new().set_bold().set_font_size(16);
    let label_format = Format::new().set_bold();
    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    let cell_format = Format::new().set_border(FormatBorder::Thin);

    worksheet.write_with_format(0, 0, "工具箱會議暨危害預知 (TBM-KY)", &title_format)?;

    let inspector_names = if inspectors.is_empty() {
        "未指定".to_string()
    } else {
        inspectors
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join("、")
    };
    let info_rows: [(&str, String); 5] = [
        ("工程序號", project.seq_no.clone()),
        ("工程名稱", project.full_name.clone().unwrap_or_else(|| project.name.clone())),
        ("承攬廠商", project.contractor.clone().unwrap_or_default()),
        ("日期", date_string.to_string()),
        ("監工", inspector_names),
    ];
    for (offset, (label, value)) in info_rows.iter().enumerate() {
        let row = 2 + offset as u32;
        worksheet.write_with_format(row, 0, *label, &label_format)?;
        worksheet.write(row, 1, value.as_str())?;
    }
    worksheet.write_with_format(7, 0, "出工人數", &label_format)?;
    worksheet.write(7, 1, f64::from(log.workers_count))?;

    let table_start: u32 = 9;
    let headers = ["項次", "工作項目", "施工地點", "危害類型", "防災對策"];
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_with_format(table_start, col as u16, *header, &header_format)?;
    }
    for (index, item) in items.iter().enumerate() {
        let row = table_start + 1 + index as u32;
        let disaster_types = item.get_disaster_types().unwrap_or_default().join("、");
        worksheet.write_with_format(row, 0, (index + 1) as f64, &cell_format)?;
        worksheet.write_with_format(row, 1, item.work_item.as_str(), &cell_format)?;
        worksheet.write_with_format(
            row,
            2,
            item.work_location.as_deref().unwrap_or(""),
            &cell_format,
        )?;
        worksheet.write_with_format(row, 3, disaster_types.as_str(), &cell_format)?;
        worksheet.write_with_format(
            row,
            4,
            item.countermeasures.as_deref().unwrap_or(""),
            &cell_format,
        )?;
    }

    worksheet.set_column_width(0, 6.0)?;
    worksheet.set_column_width(1, 32.0)?;
    worksheet.set_column_width(2, 20.0)?;
    worksheet.set_column_width(3, 24.0)?;
    worksheet.set_column_width(4, 36.0)?;

    workbook.save(path)?;
    Ok(())
}

/// 文件名中的人名去除路径分隔等不安全字符
fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("王大明"), "王大明");
        assert_eq!(sanitize_component("a/b:c"), "a_b_c");
    }
}
