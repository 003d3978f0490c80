//! # 数据库模块
//!
//! 数据库连接、迁移管理与首次启动资料初始化

use crate::config::AuthConfig;
use crate::error::{Context, Result, SiteLogError};
use bcrypt::{DEFAULT_COST, hash};
use chrono::Utc;
use entity::{users, users::Entity as Users};
use sea_orm::{Database, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Set};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// 初始化数据库连接
pub async fn init_database(database_url: &str) -> std::result::Result<DatabaseConnection, DbErr> {
    info!(
        "正在连接数据库: {}",
        if database_url.starts_with("sqlite:") {
            &database_url[..std::cmp::min(database_url.len(), 50)]
        } else {
            database_url
        }
    );

    // 对于SQLite数据库，确保数据库文件的目录和文件存在
    if database_url.starts_with("sqlite:") && !database_url.contains(":memory:") {
        let db_path = database_url
            .strip_prefix("sqlite://")
            .unwrap_or(database_url.strip_prefix("sqlite:").unwrap_or(database_url));
        let db_file_path = Path::new(db_path);

        // 确保父目录存在
        if let Some(parent_dir) = db_file_path.parent() {
            if !parent_dir.exists() {
                debug!("创建数据库目录: {}", parent_dir.display());
                std::fs::create_dir_all(parent_dir).map_err(|e| {
                    DbErr::Custom(format!(
                        "无法创建数据库目录 {}: {}",
                        parent_dir.display(),
                        e
                    ))
                })?;
                info!("数据库目录创建成功: {}", parent_dir.display());
            }
        }

        // 确保数据库文件存在（如果不存在则创建空文件）
        if !db_file_path.exists() {
            debug!("创建数据库文件: {}", db_file_path.display());
            std::fs::File::create(db_file_path).map_err(|e| {
                DbErr::Custom(format!(
                    "无法创建数据库文件 {}: {}",
                    db_file_path.display(),
                    e
                ))
            })?;
            info!("数据库文件创建成功: {}", db_file_path.display());
        }
    }

    let db = Database::connect(database_url).await?;

    info!("数据库连接成功");
    Ok(db)
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> std::result::Result<(), DbErr> {
    info!("开始运行数据库迁移...");

    match ::migration::Migrator::up(db, None).await {
        Ok(()) => {
            info!("数据库迁移完成");
            Ok(())
        }
        Err(e) => {
            error!("数据库迁移失败: {}", e);
            Err(e)
        }
    }
}

/// 首次启动时建立预设管理员
///
/// 使用者表为空才会写入，密码以 bcrypt 即时加密
pub async fn ensure_default_admin(db: &DatabaseConnection, auth: &AuthConfig) -> Result<()> {
    let user_count = Users::find()
        .count(db)
        .await
        .context("检查使用者数量失败")?;

    if user_count > 0 {
        debug!("使用者表非空，跳过预设管理员初始化");
        return Ok(());
    }

    let password_hash = hash(&auth.default_admin_password, DEFAULT_COST)
        .map_err(|e| SiteLogError::internal_with_source("预设管理员密码加密失败", e))?;
    let now = Utc::now().naive_utc();

    let admin = users::ActiveModel {
        account: Set(auth.default_admin_account.clone()),
        password_hash: Set(password_hash),
        name: Set("系統管理員".to_string()),
        role: Set(users::ROLE_ADMIN.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Users::insert(admin)
        .exec(db)
        .await
        .context("建立预设管理员失败")?;

    warn!(
        "已建立预设管理员帐号 {}，请于首次登录后立即修改密码",
        auth.default_admin_account
    );
    Ok(())
}
