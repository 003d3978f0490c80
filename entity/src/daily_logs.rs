//! # 每日填报实体定义
//!
//! 工程每日填报主表的 Sea-ORM 实体模型，工作项目在 `log_work_items` 子表

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 每日填报实体，(工程序号, 日期) 唯一
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_seq_no: String,
    pub log_date: Date,
    /// 假日不施工
    pub is_holiday_no_work: bool,
    /// 假日有施工
    pub is_holiday_work: bool,
    /// 监工编号列表，JSON 数组文本
    pub inspector_ids: Option<String>,
    pub workers_count: i32,
    /// 填报人帐号
    pub created_by: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::log_work_items::Entity")]
    LogWorkItems,
}

impl Related<super::log_work_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LogWorkItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 解析监工编号列表
    pub fn get_inspector_ids(&self) -> Result<Vec<i32>, serde_json::Error> {
        match &self.inspector_ids {
            Some(data) if !data.is_empty() => serde_json::from_str(data),
            _ => Ok(Vec::new()),
        }
    }
}
