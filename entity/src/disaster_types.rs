//! # 灾害类型实体定义
//!
//! 灾害类型字典表的 Sea-ORM 实体模型，内建分类加自订分类

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 自订灾害类型所属分类
pub const CATEGORY_CUSTOM: &str = "自訂";

/// 灾害类型实体，(分类, 名称) 唯一
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "disaster_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub category: String,
    pub type_name: String,
    pub is_custom: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
