//! # 工地填报系统核心库
//!
//! 施工日志填报后端: 单一动作端点、会话认证、假日行事历与 TBM-KY 文件产出。

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod server;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Result, SiteLogError};
