//! # 认证模块
//!
//! 凭证校验与会话管理两部分。密码一律 bcrypt 存储，
//! 会话令牌只存 SHA-256 摘要，原文仅在登录响应出现一次。

pub mod service;
pub mod session;

pub use service::{AuthService, LoginSuccess, TempPasswordOutcome, generate_temp_password};
pub use session::{AuthContext, SessionService};
