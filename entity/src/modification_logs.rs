//! # 修改纪录实体定义
//!
//! 资料异动稽核表的 Sea-ORM 实体模型，只追加不修改

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 修改纪录实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "modification_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// 异动的资料类别，如 project、daily_log
    pub log_type: String,
    pub project_seq_no: Option<String>,
    /// 异动前快照，JSON 文本
    pub old_data: Option<String>,
    /// 异动后快照，JSON 文本
    pub new_data: Option<String>,
    pub reason: Option<String>,
    pub action_type: String,
    /// 操作人帐号
    pub operator: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
