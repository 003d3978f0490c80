//! # 工程管理服务
//!
//! 工程基本资料查询与管理员编辑。编辑一律附带修改轨迹，
//! 非施工中状态必须填写状态备注。

use entity::{projects, projects::Entity as Projects};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{Context, Result, SiteLogError};

use super::modification_logs::{ModificationEntry, ModificationLogService};
use super::shared::{ServiceResponse, parse_id_list};

/// 工程响应
///
/// 状态备注对外以 `remark` 呈现，与前端编辑表单的读取字段一致。
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: i32,
    pub seq_no: String,
    pub name: String,
    pub full_name: Option<String>,
    pub contractor: Option<String>,
    pub dept: Option<String>,
    pub address: Option<String>,
    pub gps: Option<String>,
    pub resp: Option<String>,
    pub resp_phone: Option<String>,
    pub safety_officer: Option<String>,
    pub safety_phone: Option<String>,
    pub safety_license: Option<String>,
    pub project_status: String,
    pub remark: Option<String>,
    pub default_inspectors: Vec<i32>,
}

impl ProjectView {
    #[must_use]
    pub fn from_model(project: projects::Model) -> Self {
        let default_inspectors = project.get_default_inspectors().unwrap_or_default();
        Self {
            id: project.id,
            seq_no: project.seq_no,
            name: project.name,
            full_name: project.full_name,
            contractor: project.contractor,
            dept: project.dept,
            address: project.address,
            gps: project.gps,
            resp: project.resp,
            resp_phone: project.resp_phone,
            safety_officer: project.safety_officer,
            safety_phone: project.safety_phone,
            safety_license: project.safety_license,
            project_status: project.status,
            remark: project.status_remark,
            default_inspectors,
        }
    }
}

/// 工程编辑载荷，提交侧的状态备注字段为 `statusRemark`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectPayload {
    pub project_seq_no: String,
    pub resp: Option<String>,
    pub resp_phone: Option<String>,
    pub safety_officer: Option<String>,
    pub safety_phone: Option<String>,
    pub safety_license: Option<String>,
    pub project_status: Option<String>,
    pub status_remark: Option<String>,
    pub default_inspectors: Option<Value>,
    pub reason: Option<String>,
}

/// 工程服务
pub struct ProjectService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ProjectService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 全部工程，依序号排序
    pub async fn list_all(&self) -> Result<Vec<ProjectView>> {
        let projects = Projects::find()
            .order_by_asc(projects::Column::SeqNo)
            .all(self.db)
            .await
            .context("Failed to list projects")?;
        Ok(projects.into_iter().map(ProjectView::from_model).collect())
    }

    /// 施工中的工程
    pub async fn list_active(&self) -> Result<Vec<ProjectView>> {
        let projects = Projects::find()
            .filter(projects::Column::Status.eq(projects::STATUS_ACTIVE))
            .order_by_asc(projects::Column::SeqNo)
            .all(self.db)
            .await
            .context("Failed to list active projects")?;
        Ok(projects.into_iter().map(ProjectView::from_model).collect())
    }

    /// 所有出现过的主办部门，去重排序，供汇总表筛选
    pub async fn list_departments(&self) -> Result<Vec<String>> {
        let projects = Projects::find()
            .all(self.db)
            .await
            .context("Failed to list departments")?;
        let mut departments: Vec<String> = projects
            .into_iter()
            .filter_map(|p| p.dept)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        departments.sort();
        departments.dedup();
        Ok(departments)
    }

    /// 依序号查询单一工程
    pub async fn get_by_seq_no(&self, seq_no: &str) -> Result<projects::Model> {
        Projects::find()
            .filter(projects::Column::SeqNo.eq(seq_no))
            .one(self.db)
            .await
            .context("Failed to query project by seq_no")?
            .ok_or_else(|| SiteLogError::not_found("工程", seq_no))
    }

    /// 管理员编辑工程资料
    ///
    /// 每次成功编辑恰好追加一笔修改轨迹，内含修改前后完整快照。
    pub async fn update_info(
        &self,
        operator: &str,
        payload: UpdateProjectPayload,
    ) -> Result<ServiceResponse<ProjectView>> {
        let project = self.get_by_seq_no(payload.project_seq_no.trim()).await?;
        let old_view = ProjectView::from_model(project.clone());

        let final_status = match payload.project_status.as_deref().map(str::trim) {
            Some(status) if !status.is_empty() => {
                validate_status(status)?;
                status.to_string()
            }
            _ => project.status.clone(),
        };
        let final_remark = match &payload.status_remark {
            Some(remark) => {
                let trimmed = remark.trim();
                if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
            }
            None => project.status_remark.clone(),
        };
        crate::ensure_business!(
            final_status == projects::STATUS_ACTIVE || final_remark.is_some(),
            "非施工中狀態必須填寫狀態備註"
        );

        let mut active: projects::ActiveModel = project.clone().into();
        if let Some(resp) = payload.resp.clone() {
            active.resp = Set(blank_to_none(resp));
        }
        if let Some(phone) = payload.resp_phone.clone() {
            active.resp_phone = Set(blank_to_none(phone));
        }
        if let Some(officer) = payload.safety_officer.clone() {
            active.safety_officer = Set(blank_to_none(officer));
        }
        if let Some(phone) = payload.safety_phone.clone() {
            active.safety_phone = Set(blank_to_none(phone));
        }
        if let Some(license) = payload.safety_license.clone() {
            active.safety_license = Set(blank_to_none(license));
        }
        active.status = Set(final_status);
        active.status_remark = Set(final_remark);
        if let Some(raw) = payload.default_inspectors.as_ref() {
            let ids = parse_id_list(raw, "defaultInspectors")?;
            active.default_inspectors = Set(encode_inspector_ids(&ids)?);
        }
        active.updated_at = Set(Utc::now().naive_utc());

        let updated = active
            .update(self.db)
            .await
            .context("Failed to update project")?;
        let new_view = ProjectView::from_model(updated);

        let reason = payload
            .reason
            .clone()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "管理員修改".to_string());
        ModificationLogService::new(self.db)
            .append(ModificationEntry {
                log_type: "project".to_string(),
                project_seq_no: Some(new_view.seq_no.clone()),
                old_data: Some(serde_json::to_value(&old_view).unwrap_or(Value::Null)),
                new_data: Some(serde_json::to_value(&new_view).unwrap_or(Value::Null)),
                reason: Some(reason),
                action_type: "update".to_string(),
                operator: operator.to_string(),
            })
            .await?;

        info!(seq_no = %new_view.seq_no, "工程資料已更新");
        Ok(ServiceResponse::with_message(new_view, "工程資料更新成功"))
    }
}

fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn encode_inspector_ids(ids: &[i32]) -> Result<Option<String>> {
    if ids.is_empty() {
        return Ok(None);
    }
    let encoded = serde_json::to_string(ids)
        .map_err(|e| SiteLogError::serialization("预设监工列表序列化失败", e.into()))?;
    Ok(Some(encoded))
}

fn validate_status(status: &str) -> Result<()> {
    match status {
        projects::STATUS_ACTIVE
        | projects::STATUS_SUSPENDED
        | projects::STATUS_COMPLETED
        | projects::STATUS_DEREGISTERED => Ok(()),
        _ => Err(SiteLogError::validation(format!("無效的工程狀態: {status}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_status() {
        assert!(validate_status("施工中").is_ok());
        assert!(validate_status("停工").is_ok());
        assert!(validate_status("完工").is_ok());
        assert!(validate_status("解除列管").is_ok());
        assert!(validate_status("施工完畢").is_err());
    }

    #[test]
    fn test_encode_inspector_ids() {
        assert_eq!(encode_inspector_ids(&[]).unwrap(), None);
        assert_eq!(encode_inspector_ids(&[2, 5]).unwrap(), Some("[2,5]".to_string()));
    }

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none("  ".to_string()), None);
        assert_eq!(blank_to_none(" 王大明 ".to_string()), Some("王大明".to_string()));
    }
}
