//! # 帐密认证服务
//!
//! 登录、改密码、临时密码三个凭证流程。登录失败不区分帐号不存在
//! 与密码错误，一律由调度层回覆同一句提示。

use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use entity::{users, users::Entity as Users};
use rand::{Rng, distributions::Alphanumeric};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::{Context, Result, SiteLogError};
use crate::services::ServiceResponse;
use crate::services::users::UserView;

use super::session::{AuthContext, SessionService};

/// 登录成功结果
#[derive(Debug)]
pub struct LoginSuccess {
    pub user: UserView,
    pub token: String,
}

/// 临时密码签发结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TempPasswordOutcome {
    pub account: String,
    pub temp_password: String,
}

/// 认证服务
pub struct AuthService<'a> {
    db: &'a DatabaseConnection,
    auth: &'a AuthConfig,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection, auth: &'a AuthConfig) -> Self {
        Self { db, auth }
    }

    /// 帐号或 Email 加密码登录
    ///
    /// 凭证不符回传 `Ok(None)`，由调度层转为统一的失败提示。
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<LoginSuccess>> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Ok(None);
        }
        let Some(user) = self.find_by_identifier(identifier).await? else {
            warn!(identifier = %identifier, "登录失败: 帐号不存在");
            return Ok(None);
        };
        let verified = verify(password, &user.password_hash).unwrap_or(false);
        if !verified {
            warn!(account = %user.account, "登录失败: 密码不符");
            return Ok(None);
        }

        let user_id = user.id;
        let mut active: users::ActiveModel = user.into();
        active.last_login = Set(Some(Utc::now().naive_utc()));
        let user = active
            .update(self.db)
            .await
            .context("Failed to record last login")?;

        let token = SessionService::new(self.db)
            .issue(user_id, self.auth.session_ttl_hours)
            .await?;
        info!(account = %user.account, "登录成功");
        Ok(Some(LoginSuccess {
            user: UserView::from_model(user),
            token,
        }))
    }

    /// 修改密码，仅限本人或管理员会话
    pub async fn change_password(
        &self,
        ctx: &AuthContext,
        account: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<ServiceResponse<()>> {
        let account = account.trim();
        if account.is_empty() {
            return Err(SiteLogError::validation_field("缺少必要参数: account", "account"));
        }
        if ctx.user.account != account && !ctx.is_admin() {
            return Err(crate::permission_error!("只能修改自己的密碼"));
        }
        let user = Users::find()
            .filter(users::Column::Account.eq(account))
            .one(self.db)
            .await
            .context("Failed to query user for password change")?
            .ok_or_else(|| SiteLogError::not_found("使用者", account))?;

        let verified = verify(old_password, &user.password_hash).unwrap_or(false);
        if !verified {
            return Err(SiteLogError::business("目前密碼錯誤"));
        }
        if new_password.len() < 6 {
            return Err(SiteLogError::validation("密碼長度至少 6 碼"));
        }

        let user_id = user.id;
        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(hash_password(new_password)?);
        active.updated_at = Set(Utc::now().naive_utc());
        active
            .update(self.db)
            .await
            .context("Failed to update password")?;
        // 改密后全部会话作废，持新密码重新登录
        SessionService::new(self.db).revoke_all_for(user_id).await?;

        info!(account = %account, "密碼已修改");
        Ok(ServiceResponse::with_message((), "密碼已更新，請重新登入"))
    }

    /// 产生临时密码并作废旧会话
    ///
    /// 本系统未接邮件服务，临时密码直接随响应带回，由管理员转交。
    pub async fn send_temporary_password(
        &self,
        input: &str,
    ) -> Result<ServiceResponse<TempPasswordOutcome>> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SiteLogError::validation_field("缺少必要参数: input", "input"));
        }
        let user = self
            .find_by_identifier(input)
            .await?
            .ok_or_else(|| SiteLogError::business("查無此帳號或 Email"))?;

        let temp_password = generate_temp_password(self.auth.temp_password_length);
        let user_id = user.id;
        let account = user.account.clone();
        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(hash_password(&temp_password)?);
        active.updated_at = Set(Utc::now().naive_utc());
        active
            .update(self.db)
            .await
            .context("Failed to store temporary password")?;
        SessionService::new(self.db).revoke_all_for(user_id).await?;

        info!(account = %account, "臨時密碼已產生");
        Ok(ServiceResponse::with_message(
            TempPasswordOutcome {
                account,
                temp_password,
            },
            "臨時密碼已產生，請儘速登入並修改密碼",
        ))
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(
                users::Column::Account
                    .eq(identifier)
                    .or(users::Column::Email.eq(identifier)),
            )
            .one(self.db)
            .await
            .context("Failed to query user by identifier")
    }
}

/// 随机英数临时密码
#[must_use]
pub fn generate_temp_password(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length.max(8))
        .map(char::from)
        .collect()
}

fn hash_password(password: &str) -> Result<String> {
    hash(password, DEFAULT_COST).map_err(|e| SiteLogError::internal_with_source("密码加密失败", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_temp_password_length_floor() {
        assert_eq!(generate_temp_password(10).len(), 10);
        // 长度下限 8，避免配置过短
        assert_eq!(generate_temp_password(3).len(), 8);
        assert!(generate_temp_password(12).chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_passwords_differ() {
        assert_ne!(generate_temp_password(16), generate_temp_password(16));
    }
}
