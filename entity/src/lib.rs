//! # Entity 模块
//!
//! 包含所有 Sea-ORM 实体定义

pub mod users;
pub mod user_sessions;
pub mod projects;
pub mod inspectors;
pub mod daily_logs;
pub mod log_work_items;
pub mod holidays;
pub mod disaster_types;
pub mod modification_logs;

pub use users::Entity as Users;
pub use user_sessions::Entity as UserSessions;
pub use projects::Entity as Projects;
pub use inspectors::Entity as Inspectors;
pub use daily_logs::Entity as DailyLogs;
pub use log_work_items::Entity as LogWorkItems;
pub use holidays::Entity as Holidays;
pub use disaster_types::Entity as DisasterTypes;
pub use modification_logs::Entity as ModificationLogs;
