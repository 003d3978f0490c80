//! # 工地填报系统主程序
//!
//! 施工日志填报后端服务入口: 读配置、连库、跑迁移、起 HTTP 服务。

use clap::Parser;
use sitelog_api::{Result, SiteLogError, config, database, logging, server};
use std::sync::Arc;
use tracing::info;

/// 命令行参数
#[derive(Parser)]
#[command(
    name = "sitelog-api",
    version = env!("CARGO_PKG_VERSION"),
    about = "Construction-site daily log reporting backend",
    long_about = None
)]
struct Cli {
    /// 配置文件路径，未指定时按 RUST_ENV 寻找 config/config.{env}.toml
    #[arg(long = "config", short = 'c')]
    config: Option<String>,

    /// 覆盖配置中的监听地址
    #[arg(long = "bind")]
    bind_address: Option<String>,

    /// 覆盖配置中的监听端口
    #[arg(long = "port", short = 'p')]
    port: Option<u16>,

    /// 日志级别 (trace/debug/info/warn/error)
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// 只执行数据库迁移后退出
    #[arg(long = "migrate-only")]
    migrate_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_ref());

    let mut app_config = config::load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind_address {
        app_config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        app_config.server.port = port;
    }

    let db = database::init_database(&app_config.database.url)
        .await
        .map_err(|e| SiteLogError::database_with_source("数据库连接失败", e))?;
    database::run_migrations(&db)
        .await
        .map_err(|e| SiteLogError::database_with_source("数据库迁移失败", e))?;

    if cli.migrate_only {
        info!("迁移完成，依 --migrate-only 退出");
        return Ok(());
    }

    database::ensure_default_admin(&db, &app_config.auth).await?;

    let state = server::AppState::new(db, Arc::new(app_config));
    server::serve(state).await
}
