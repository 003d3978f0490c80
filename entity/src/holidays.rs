//! # 假日行事历实体定义
//!
//! 假日设定表的 Sea-ORM 实体模型，未设定的日期按周末默认规则判定

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 假日实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "holidays")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub holiday_date: Date,
    pub is_holiday: bool,
    pub remark: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
