//! # 填报工作项目实体定义
//!
//! 每日填报的工作项目子表，随主表级联删除

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 填报工作项目实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "log_work_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub daily_log_id: i32,
    pub sort_order: i32,
    pub work_item: String,
    pub work_location: Option<String>,
    /// 灾害类型标签列表，JSON 数组文本
    pub disaster_types: Option<String>,
    /// 防灾对策
    pub countermeasures: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::daily_logs::Entity",
        from = "Column::DailyLogId",
        to = "super::daily_logs::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    DailyLog,
}

impl Related<super::daily_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 解析灾害类型标签列表
    pub fn get_disaster_types(&self) -> Result<Vec<String>, serde_json::Error> {
        match &self.disaster_types {
            Some(data) if !data.is_empty() => serde_json::from_str(data),
            _ => Ok(Vec::new()),
        }
    }
}
