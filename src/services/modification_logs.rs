//! # 修改轨迹服务
//!
//! 追加式记录管理员对工程与填报资料的修改，带修改前后快照与事由。

use chrono::Utc;
use entity::{modification_logs, modification_logs::Entity as ModificationLogs};
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use serde_json::Value;
use tracing::debug;

use crate::error::{Context, Result, SiteLogError};

use super::shared::ServiceResponse;

/// 一笔修改记录
#[derive(Debug, Clone)]
pub struct ModificationEntry {
    pub log_type: String,
    pub project_seq_no: Option<String>,
    pub old_data: Option<Value>,
    pub new_data: Option<Value>,
    pub reason: Option<String>,
    pub action_type: String,
    pub operator: String,
}

/// 修改轨迹服务
pub struct ModificationLogService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ModificationLogService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 追加一笔修改记录，回传新记录编号
    pub async fn append(&self, entry: ModificationEntry) -> Result<ServiceResponse<i32>> {
        if entry.log_type.trim().is_empty() {
            return Err(SiteLogError::validation("缺少必要参数: type"));
        }
        if entry.action_type.trim().is_empty() {
            return Err(SiteLogError::validation("缺少必要参数: actionType"));
        }

        let model = modification_logs::ActiveModel {
            log_type: Set(entry.log_type.clone()),
            project_seq_no: Set(entry.project_seq_no),
            old_data: Set(encode_snapshot(entry.old_data)?),
            new_data: Set(encode_snapshot(entry.new_data)?),
            reason: Set(entry.reason),
            action_type: Set(entry.action_type.clone()),
            operator: Set(entry.operator),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        let inserted = ModificationLogs::insert(model)
            .exec(self.db)
            .await
            .context("Failed to append modification log")?;

        debug!(
            log_type = %entry.log_type,
            action_type = %entry.action_type,
            id = inserted.last_insert_id,
            "修改轨迹已记录"
        );
        Ok(ServiceResponse::with_message(
            inserted.last_insert_id,
            "修改記錄已保存",
        ))
    }
}

fn encode_snapshot(snapshot: Option<Value>) -> Result<Option<String>> {
    match snapshot {
        Some(Value::Null) | None => Ok(None),
        // 字符串视为已编码完成的快照，照原样保存
        Some(Value::String(s)) => Ok(Some(s)),
        Some(value) => {
            let encoded = serde_json::to_string(&value)
                .map_err(|e| SiteLogError::serialization("修改快照序列化失败", e.into()))?;
            Ok(Some(encoded))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_snapshot_variants() {
        assert_eq!(encode_snapshot(None).unwrap(), None);
        assert_eq!(encode_snapshot(Some(Value::Null)).unwrap(), None);
        assert_eq!(
            encode_snapshot(Some(json!("already-a-string"))).unwrap(),
            Some("already-a-string".to_string())
        );
        assert_eq!(
            encode_snapshot(Some(json!({"resp": "王大明"}))).unwrap(),
            Some(r#"{"resp":"王大明"}"#.to_string())
        );
    }
}
