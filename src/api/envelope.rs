//! # API 响应信封
//!
//! 所有动作统一回传 `{success, message?, data?}` 信封，登录另带 `user` 与 `token`，
//! 服务端内部错误附带 `stack` 诊断字段。HTTP 状态码固定 200，呼叫端以 `success` 判断结果。

use crate::error::{ErrorCategory, SiteLogError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

/// 统一 API 信封
#[derive(Debug, Serialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ApiEnvelope {
    /// 成功信封，仅携带资料
    #[must_use]
    pub const fn ok(data: Value) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            user: None,
            token: None,
            stack: None,
        }
    }

    /// 成功信封，携带资料与提示消息
    #[must_use]
    pub fn ok_with_message(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            user: None,
            token: None,
            stack: None,
        }
    }

    /// 成功信封，仅携带提示消息
    #[must_use]
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            user: None,
            token: None,
            stack: None,
        }
    }

    /// 登录成功信封，`user` 与 `token` 置于信封顶层
    #[must_use]
    pub fn login(user: Value, token: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            user: Some(user),
            token: Some(token.into()),
            stack: None,
        }
    }

    /// 会话查询成功信封，`user` 置于信封顶层
    #[must_use]
    pub const fn session(user: Value) -> Self {
        Self {
            success: true,
            message: None,
            data: None,
            user: Some(user),
            token: None,
            stack: None,
        }
    }

    /// 失败信封
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            user: None,
            token: None,
            stack: None,
        }
    }

    /// 由应用错误产生失败信封，服务端错误附带诊断堆栈
    #[must_use]
    pub fn from_error(error: &SiteLogError) -> Self {
        let mut envelope = Self::failure(error.to_string());
        if error.category() == ErrorCategory::Server {
            envelope.stack = Some(format!("{error:?}"));
        }
        envelope
    }
}

impl IntoResponse for ApiEnvelope {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_shape() {
        let envelope = ApiEnvelope::ok(json!([1, 2, 3]));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["data"], json!([1, 2, 3]));
        // 未使用的字段不得出现在序列化结果中
        assert!(value.get("message").is_none());
        assert!(value.get("user").is_none());
        assert!(value.get("stack").is_none());
    }

    #[test]
    fn test_login_envelope_has_top_level_user_and_token() {
        let envelope = ApiEnvelope::login(json!({"account": "admin"}), "tok-1", "登入成功");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["user"]["account"], json!("admin"));
        assert_eq!(value["token"], json!("tok-1"));
    }

    #[test]
    fn test_client_error_has_no_stack() {
        let err = SiteLogError::business("狀態備註不得為空");
        let envelope = ApiEnvelope::from_error(&err);

        assert!(!envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("业务错误: 狀態備註不得為空"));
        assert!(envelope.stack.is_none());
    }

    #[test]
    fn test_server_error_carries_stack() {
        let err: SiteLogError = sea_orm::DbErr::Custom("连接中断".to_string()).into();
        let envelope = ApiEnvelope::from_error(&err);

        assert!(!envelope.success);
        assert!(envelope.stack.is_some(), "服务端错误应附带诊断堆栈");
    }
}
