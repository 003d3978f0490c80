//! # 使用者实体定义
//!
//! 系统使用者表的 Sea-ORM 实体模型

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 管理员角色值
pub const ROLE_ADMIN: &str = "管理員";
/// 填表人角色值
pub const ROLE_FILLER: &str = "填表人";
/// 联络员角色值
pub const ROLE_LIAISON: &str = "聯絡員";

/// 使用者实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub account: String,
    pub password_hash: String,
    pub name: String,
    pub dept: Option<String>,
    #[sea_orm(unique)]
    pub email: Option<String>,
    pub role: String,
    /// 负责的工程序号列表，JSON 数组文本
    pub managed_projects: Option<String>,
    pub supervisor_email: Option<String>,
    pub last_login: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_sessions::Entity")]
    UserSessions,
}

impl Related<super::user_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 是否为管理员
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// 是否为联络员
    #[must_use]
    pub fn is_liaison(&self) -> bool {
        self.role == ROLE_LIAISON
    }

    /// 解析负责工程序号列表
    pub fn get_managed_projects(&self) -> Result<Vec<String>, serde_json::Error> {
        match &self.managed_projects {
            Some(data) if !data.is_empty() => serde_json::from_str(data),
            _ => Ok(Vec::new()),
        }
    }
}
