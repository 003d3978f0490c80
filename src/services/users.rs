//! # 使用者管理服务
//!
//! 集中管理使用者查询、新增、更新、删除等业务逻辑，供调度器复用。

use bcrypt::{DEFAULT_COST, hash};
use chrono::Utc;
use entity::{users, users::Entity as Users};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::generate_temp_password;
use crate::config::AuthConfig;
use crate::error::{Context, Result, SiteLogError};

use super::shared::ServiceResponse;

/// 新增与更新共用的使用者资料载荷
///
/// 对应前端送出的 `userData` 物件，更新时以 `userId`、`rowIndex` 或 `account` 识别对象。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub user_id: Option<i32>,
    pub row_index: Option<i32>,
    pub account: Option<String>,
    pub name: Option<String>,
    pub dept: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub managed_projects: Option<Vec<String>>,
    pub supervisor_email: Option<String>,
    pub password: Option<String>,
}

/// 使用者响应，不含任何密码字段
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i32,
    pub account: String,
    pub name: String,
    pub dept: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub managed_projects: Vec<String>,
    pub supervisor_email: Option<String>,
    pub last_login: Option<String>,
    pub created_at: String,
}

impl UserView {
    #[must_use]
    pub fn from_model(user: users::Model) -> Self {
        let managed_projects = user.get_managed_projects().unwrap_or_default();
        Self {
            id: user.id,
            account: user.account,
            name: user.name,
            dept: user.dept,
            email: user.email,
            role: user.role,
            managed_projects,
            supervisor_email: user.supervisor_email,
            last_login: user.last_login.map(|dt| format_timestamp(&dt)),
            created_at: format_timestamp(&user.created_at),
        }
    }
}

/// 新增使用者的结果，未指定密码时带回系统产生的临时密码
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserOutcome {
    pub user: UserView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_password: Option<String>,
}

/// 使用者服务
pub struct UserService<'a> {
    db: &'a DatabaseConnection,
    auth: &'a AuthConfig,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection, auth: &'a AuthConfig) -> Self {
        Self { db, auth }
    }

    /// 全部使用者，依编号排序
    pub async fn list(&self) -> Result<Vec<UserView>> {
        let users = Users::find()
            .order_by_asc(users::Column::Id)
            .all(self.db)
            .await
            .context("Failed to list users")?;
        Ok(users.into_iter().map(UserView::from_model).collect())
    }

    /// 依帐号查询单一使用者
    pub async fn get_by_account(&self, account: &str) -> Result<UserView> {
        let user = Users::find()
            .filter(users::Column::Account.eq(account))
            .one(self.db)
            .await
            .context("Failed to query user by account")?
            .ok_or_else(|| SiteLogError::not_found("使用者", account))?;
        Ok(UserView::from_model(user))
    }

    /// 新增使用者
    ///
    /// 未提供密码时产生临时密码并随响应带回，由管理员转交使用者。
    pub async fn create(&self, payload: UserPayload) -> Result<ServiceResponse<AddUserOutcome>> {
        let account = required_trimmed(payload.account.as_deref(), "帳號不得為空")?;
        let name = required_trimmed(payload.name.as_deref(), "姓名不得為空")?;
        let role = payload
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(users::ROLE_FILLER)
            .to_string();
        validate_role(&role)?;
        let email = normalize_optional(payload.email);
        if let Some(email) = email.as_deref() {
            validate_email(email)?;
        }

        self.ensure_unique_account(&account).await?;
        if let Some(email) = email.as_deref() {
            self.ensure_unique_email(email, None).await?;
        }

        let (password, temp_password) = match normalize_optional(payload.password) {
            Some(given) => {
                validate_password(&given)?;
                (given, None)
            }
            None => {
                let temp = generate_temp_password(self.auth.temp_password_length);
                (temp.clone(), Some(temp))
            }
        };
        let password_hash = hash_password(&password)?;

        let now = Utc::now().naive_utc();
        let model = users::ActiveModel {
            account: Set(account.clone()),
            password_hash: Set(password_hash),
            name: Set(name),
            dept: Set(normalize_optional(payload.dept)),
            email: Set(email),
            role: Set(role),
            managed_projects: Set(encode_managed_projects(payload.managed_projects.as_deref())?),
            supervisor_email: Set(normalize_optional(payload.supervisor_email)),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let inserted = Users::insert(model)
            .exec(self.db)
            .await
            .context("Failed to create user")?;

        let created = self.fetch_user(inserted.last_insert_id).await?;
        info!(account = %account, "使用者已新增");
        Ok(ServiceResponse::with_message(
            AddUserOutcome {
                user: UserView::from_model(created),
                temp_password,
            },
            "使用者新增成功",
        ))
    }

    /// 更新使用者，帐号不可变更
    pub async fn update(&self, payload: UserPayload) -> Result<ServiceResponse<UserView>> {
        let user = self.resolve_target(&payload).await?;

        if let Some(account) = payload.account.as_deref().map(str::trim)
            && !account.is_empty()
            && account != user.account
        {
            return Err(SiteLogError::business("帳號不可修改"));
        }

        let mut active: users::ActiveModel = user.clone().into();
        if let Some(name) = payload.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            active.name = Set(name.to_string());
        }
        if payload.dept.is_some() {
            active.dept = Set(normalize_optional(payload.dept));
        }
        if let Some(email) = normalize_optional(payload.email.clone()) {
            validate_email(&email)?;
            self.ensure_unique_email(&email, Some(user.id)).await?;
            active.email = Set(Some(email));
        }
        if let Some(role) = payload.role.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            validate_role(role)?;
            active.role = Set(role.to_string());
        }
        if payload.managed_projects.is_some() {
            active.managed_projects =
                Set(encode_managed_projects(payload.managed_projects.as_deref())?);
        }
        if payload.supervisor_email.is_some() {
            active.supervisor_email = Set(normalize_optional(payload.supervisor_email));
        }
        if let Some(password) = normalize_optional(payload.password) {
            validate_password(&password)?;
            active.password_hash = Set(hash_password(&password)?);
        }
        active.updated_at = Set(Utc::now().naive_utc());

        let updated = active.update(self.db).await.context("Failed to update user")?;
        info!(account = %updated.account, "使用者已更新");
        Ok(ServiceResponse::with_message(
            UserView::from_model(updated),
            "使用者更新成功",
        ))
    }

    /// 删除使用者，会话列随外键一并清除
    pub async fn delete(&self, user_id: i32) -> Result<ServiceResponse<()>> {
        let user = self.fetch_user(user_id).await?;
        let account = user.account.clone();
        Users::delete_by_id(user.id)
            .exec(self.db)
            .await
            .context("Failed to delete user")?;
        info!(account = %account, "使用者已刪除");
        Ok(ServiceResponse::with_message((), "使用者刪除成功"))
    }

    async fn fetch_user(&self, user_id: i32) -> Result<users::Model> {
        Users::find_by_id(user_id)
            .one(self.db)
            .await
            .context("Failed to fetch user")?
            .ok_or_else(|| SiteLogError::not_found("使用者", user_id.to_string()))
    }

    /// 依 `userId`、`rowIndex`(旧版别名)、`account` 的顺序识别更新对象
    async fn resolve_target(&self, payload: &UserPayload) -> Result<users::Model> {
        if let Some(id) = payload.user_id.or(payload.row_index) {
            return self.fetch_user(id).await;
        }
        if let Some(account) = payload.account.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return Users::find()
                .filter(users::Column::Account.eq(account))
                .one(self.db)
                .await
                .context("Failed to query user by account")?
                .ok_or_else(|| SiteLogError::not_found("使用者", account));
        }
        Err(SiteLogError::validation("缺少使用者識別欄位"))
    }

    async fn ensure_unique_account(&self, account: &str) -> Result<()> {
        let existing = Users::find()
            .filter(users::Column::Account.eq(account))
            .one(self.db)
            .await
            .context("Failed to check account uniqueness")?;
        if existing.is_some() {
            return Err(SiteLogError::business("帳號已存在"));
        }
        Ok(())
    }

    async fn ensure_unique_email(&self, email: &str, exclude_id: Option<i32>) -> Result<()> {
        let mut select = Users::find().filter(users::Column::Email.eq(email));
        if let Some(id) = exclude_id {
            select = select.filter(users::Column::Id.ne(id));
        }
        let existing = select
            .one(self.db)
            .await
            .context("Failed to check email uniqueness")?;
        if existing.is_some() {
            return Err(SiteLogError::business("Email 已被其他使用者使用"));
        }
        Ok(())
    }
}

fn format_timestamp(dt: &chrono::NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn required_trimmed(value: Option<&str>, message: &str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(SiteLogError::validation(message)),
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn encode_managed_projects(projects: Option<&[String]>) -> Result<Option<String>> {
    match projects {
        Some(list) if !list.is_empty() => {
            let encoded = serde_json::to_string(list)
                .map_err(|e| SiteLogError::serialization("负责工程列表序列化失败", e.into()))?;
            Ok(Some(encoded))
        }
        _ => Ok(None),
    }
}

fn validate_role(role: &str) -> Result<()> {
    match role {
        users::ROLE_ADMIN | users::ROLE_FILLER | users::ROLE_LIAISON => Ok(()),
        _ => Err(SiteLogError::validation(format!("無效的角色: {role}"))),
    }
}

fn validate_email(email: &str) -> Result<()> {
    if email.len() <= 100 && email.contains('@') {
        Ok(())
    } else {
        Err(SiteLogError::validation("Email 格式無效"))
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.len() >= 6 {
        Ok(())
    } else {
        Err(SiteLogError::validation("密碼長度至少 6 碼"))
    }
}

fn hash_password(password: &str) -> Result<String> {
    hash(password, DEFAULT_COST).map_err(|e| SiteLogError::internal_with_source("密码加密失败", e))
}
