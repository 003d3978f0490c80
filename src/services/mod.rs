//! # 业务服务层
//!
//! 调度器解析请求后交由各领域服务执行，服务统一回传
//! `ServiceResponse`，由信封层转为对外 JSON。

pub mod daily_logs;
pub mod disaster_types;
pub mod holidays;
pub mod inspectors;
pub mod modification_logs;
pub mod projects;
pub mod reports;
pub mod shared;
pub mod tbm;
pub mod users;

pub use shared::ServiceResponse;
