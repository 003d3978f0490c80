//! # 配置管理模块
//!
//! 处理应用配置加载、验证和管理

mod app_config;

pub use app_config::{AppConfig, AuthConfig, DatabaseConfig, LockConfig, ServerConfig, TbmConfig};

use std::env;
use std::path::Path;

/// 加载配置文件
///
/// 未指定路径时按 `RUST_ENV` 寻找 `config/config.{env}.toml`，
/// 两者都不存在时回退到内建默认值
pub fn load_config(path: Option<&str>) -> crate::error::Result<AppConfig> {
    let config_file = path.map_or_else(
        || {
            let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
            format!("config/config.{env}.toml")
        },
        std::string::ToString::to_string,
    );

    let config = if Path::new(&config_file).exists() {
        let config_content = std::fs::read_to_string(&config_file).map_err(|e| {
            crate::error::SiteLogError::config_with_source(
                format!("读取配置文件失败: {config_file}"),
                e,
            )
        })?;
        toml::from_str(&config_content)?
    } else if path.is_some() {
        // 明确指定的配置文件必须存在
        return Err(crate::error::SiteLogError::config(format!(
            "配置文件不存在: {config_file}"
        )));
    } else {
        tracing::info!("未找到配置文件 {config_file}，使用默认配置");
        AppConfig::default()
    };

    // 验证配置的有效性
    validate_config(&config)?;

    Ok(config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> crate::error::Result<()> {
    // 验证服务器配置
    if config.server.port == 0 {
        return Err(crate::config_error!("无效的服务器端口: {}", config.server.port));
    }

    // 验证数据库配置
    if config.database.url.is_empty() {
        return Err(crate::config_error!("数据库URL不能为空"));
    }

    if config.database.max_connections == 0 {
        return Err(crate::config_error!("数据库最大连接数必须大于0"));
    }

    // 验证认证配置
    if config.auth.session_ttl_hours <= 0 {
        return Err(crate::config_error!("会话有效时长必须大于0"));
    }

    if config.auth.temp_password_length < 8 {
        return Err(crate::config_error!("临时密码长度至少8字符"));
    }

    // 验证锁配置
    if config.locks.wait_timeout_secs == 0 {
        return Err(crate::config_error!("锁等待上限必须大于0"));
    }

    // 验证TBM配置
    if config.tbm.output_dir.is_empty() {
        return Err(crate::config_error!("TBM 产出目录不能为空"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok(), "默认配置应通过验证");
        assert_eq!(config.locks.wait_timeout_secs, 30);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_parse_partial_toml() {
        // 缺省的段落回退到默认值
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            bind_address = "127.0.0.1"
            port = 9000
            enable_cors = false
            cors_origins = []

            [tbm]
            output_dir = "/tmp/tbm-out"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.tbm.output_dir, "/tmp/tbm-out");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.auth.session_ttl_hours, 12);
    }
}
