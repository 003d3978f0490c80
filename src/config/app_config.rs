//! # 应用配置结构定义

use serde::{Deserialize, Serialize};

/// 应用主配置结构
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 认证配置
    #[serde(default)]
    pub auth: AuthConfig,
    /// 写入锁配置
    #[serde(default)]
    pub locks: LockConfig,
    /// TBM 文件产出配置
    #[serde(default)]
    pub tbm: TbmConfig,
}

/// HTTP 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    pub bind_address: String,
    /// 监听端口
    pub port: u16,
    /// 是否启用CORS
    pub enable_cors: bool,
    /// 允许的CORS源地址
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库URL
    pub url: String,
    /// 最大连接数
    pub max_connections: u32,
    /// 连接超时时间（秒）
    pub connect_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/sitelog.db".to_string(),
            max_connections: 10,
            connect_timeout: 30,
        }
    }
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 会话有效时长（小时）
    pub session_ttl_hours: i64,
    /// 首次启动建立的预设管理员帐号
    pub default_admin_account: String,
    /// 预设管理员初始密码，应于首次登录后修改
    pub default_admin_password: String,
    /// 临时密码长度
    pub temp_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 12,
            default_admin_account: "admin".to_string(),
            default_admin_password: "admin123".to_string(),
            temp_password_length: 10,
        }
    }
}

/// 写入锁配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// 锁等待上限（秒），超时回报可重试失败
    pub wait_timeout_secs: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: 30,
        }
    }
}

/// TBM 文件产出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TbmConfig {
    /// 产出目录
    pub output_dir: String,
}

impl Default for TbmConfig {
    fn default() -> Self {
        Self {
            output_dir: "./data/tbm".to_string(),
        }
    }
}
