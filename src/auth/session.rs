//! # 会话管理
//!
//! 登录时签发不透明 token (uuid v4)，数据库只存 SHA-256 摘要。
//! 解析会话时过期与未知一视同仁回传 `None`，不保留全局会话状态。

use chrono::{Duration, Utc};
use entity::{
    user_sessions, user_sessions::Entity as UserSessions, users, users::Entity as Users,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Context, Result};

/// 已验证的请求身份
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: users::Model,
}

impl AuthContext {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    #[must_use]
    pub fn is_liaison(&self) -> bool {
        self.user.is_liaison()
    }

    /// 修改轨迹与填报记录使用的操作者名称
    #[must_use]
    pub fn operator(&self) -> &str {
        &self.user.name
    }
}

/// 会话服务
pub struct SessionService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SessionService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 为使用者签发新会话，回传原始 token
    ///
    /// 顺手清掉该使用者已过期的会话列。
    pub async fn issue(&self, user_id: i32, ttl_hours: i64) -> Result<String> {
        let now = Utc::now().naive_utc();
        UserSessions::delete_many()
            .filter(user_sessions::Column::UserId.eq(user_id))
            .filter(user_sessions::Column::ExpiresAt.lte(now))
            .exec(self.db)
            .await
            .context("Failed to prune expired sessions")?;

        let token = Uuid::new_v4().to_string();
        let model = user_sessions::ActiveModel {
            user_id: Set(user_id),
            token_hash: Set(hash_token(&token)),
            expires_at: Set(now + Duration::hours(ttl_hours)),
            created_at: Set(now),
            ..Default::default()
        };
        UserSessions::insert(model)
            .exec(self.db)
            .await
            .context("Failed to insert session")?;
        Ok(token)
    }

    /// 解析 token，未知或已过期回传 `None`
    pub async fn resolve(&self, token: &str) -> Result<Option<AuthContext>> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let session = UserSessions::find()
            .filter(user_sessions::Column::TokenHash.eq(hash_token(trimmed)))
            .one(self.db)
            .await
            .context("Failed to query session")?;
        let Some(session) = session else {
            return Ok(None);
        };
        if session.expires_at <= Utc::now().naive_utc() {
            debug!(session_id = session.id, "会话已过期");
            return Ok(None);
        }
        let user = Users::find_by_id(session.user_id)
            .one(self.db)
            .await
            .context("Failed to load session user")?;
        Ok(user.map(|user| AuthContext { user }))
    }

    /// 注销 token，重复注销不报错
    pub async fn revoke(&self, token: &str) -> Result<()> {
        UserSessions::delete_many()
            .filter(user_sessions::Column::TokenHash.eq(hash_token(token.trim())))
            .exec(self.db)
            .await
            .context("Failed to revoke session")?;
        Ok(())
    }

    /// 注销使用者的全部会话，回传注销数
    pub async fn revoke_all_for(&self, user_id: i32) -> Result<u64> {
        let result = UserSessions::delete_many()
            .filter(user_sessions::Column::UserId.eq(user_id))
            .exec(self.db)
            .await
            .context("Failed to revoke user sessions")?;
        Ok(result.rows_affected)
    }
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let a = hash_token("tok-1");
        let b = hash_token("tok-1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hash_token("tok-2"), a);
    }
}
