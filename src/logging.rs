//! # 日志配置模块
//!
//! 提供统一的日志初始化，默认压低数据库查询日志噪音

use std::env;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 初始化日志系统
///
/// `RUST_LOG` 优先，其次采用传入级别，默认 `info`
pub fn init_logging(log_level: Option<&String>) {
    let level = log_level.map_or("info", std::string::String::as_str);

    // 默认配置：压制数据库查询的详细日志
    let default_filter = format!("{level},sitelog_api=debug,sqlx::query=off,sea_orm::query=warn,sqlx=warn");

    let log_filter = env::var("RUST_LOG").unwrap_or(default_filter);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into()))
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();

    if env::var("RUST_LOG").is_ok_and(|v| v.contains("sqlx::query=info") || v.contains("sqlx::query=debug")) {
        tracing::info!("SQLx database query logging enabled");
    } else {
        tracing::debug!("SQLx database query logging disabled");
    }
}
