//! # 工程实体定义
//!
//! 列管工程基本资料表的 Sea-ORM 实体模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 施工中状态值
pub const STATUS_ACTIVE: &str = "施工中";
/// 停工状态值
pub const STATUS_SUSPENDED: &str = "停工";
/// 完工状态值
pub const STATUS_COMPLETED: &str = "完工";
/// 解除列管状态值
pub const STATUS_DEREGISTERED: &str = "解除列管";

/// 工程实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// 工程序号，业务主键
    #[sea_orm(unique)]
    pub seq_no: String,
    pub name: String,
    pub full_name: Option<String>,
    pub contractor: Option<String>,
    pub dept: Option<String>,
    pub address: Option<String>,
    pub gps: Option<String>,
    /// 工地负责人
    pub resp: Option<String>,
    pub resp_phone: Option<String>,
    /// 职安卫人员
    pub safety_officer: Option<String>,
    pub safety_phone: Option<String>,
    pub safety_license: Option<String>,
    pub status: String,
    /// 状态备注，非施工中时必填
    pub status_remark: Option<String>,
    /// 预设监工编号列表，JSON 数组文本
    pub default_inspectors: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 是否为施工中工程
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }

    /// 解析预设监工编号列表
    pub fn get_default_inspectors(&self) -> Result<Vec<i32>, serde_json::Error> {
        match &self.default_inspectors {
            Some(data) if !data.is_empty() => serde_json::from_str(data),
            _ => Ok(Vec::new()),
        }
    }
}
