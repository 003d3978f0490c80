//! # 错误类型定义

use thiserror::Error;

/// 应用主要错误类型
#[derive(Debug, Error)]
pub enum SiteLogError {
    /// 配置相关错误
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 数据库相关错误
    #[error("数据库错误: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 请求参数验证错误
    #[error("验证错误: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// 登录认证错误
    #[error("认证错误: {message}")]
    Auth { message: String },

    /// 权限错误
    #[error("权限错误: {message}")]
    Permission { message: String },

    /// 业务逻辑错误
    #[error("业务错误: {message}")]
    Business { message: String },

    /// 资源未找到错误
    #[error("资源未找到: {resource_type} {identifier}")]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    /// 资源冲突错误
    #[error("资源冲突: {resource_type} {identifier}")]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    /// 写入锁等待超时
    #[error("资源忙碌: {domain} 锁等待超过 {timeout_seconds} 秒")]
    LockTimeout {
        domain: String,
        timeout_seconds: u64,
    },

    /// IO相关错误
    #[error("IO错误: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// 序列化/反序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// 文件产出错误
    #[error("文件产出错误: {message}")]
    Document {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 系统内部错误
    #[error("内部错误: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 带上下文的错误包装
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<SiteLogError>,
    },
}

impl SiteLogError {
    /// 创建配置错误
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的配置错误
    pub fn config_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建数据库错误
    pub fn database<T: Into<String>>(message: T) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的数据库错误
    pub fn database_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Database {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建验证错误
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// 创建指明字段的验证错误
    pub fn validation_field<T: Into<String>, F: Into<String>>(message: T, field: F) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// 创建认证错误
    pub fn auth<T: Into<String>>(message: T) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// 创建权限错误
    pub fn permission<T: Into<String>>(message: T) -> Self {
        Self::Permission {
            message: message.into(),
        }
    }

    /// 创建业务错误
    pub fn business<T: Into<String>>(message: T) -> Self {
        Self::Business {
            message: message.into(),
        }
    }

    /// 创建资源未找到错误
    pub fn not_found<T: Into<String>, I: Into<String>>(resource_type: T, identifier: I) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
        }
    }

    /// 创建资源冲突错误
    pub fn conflict<T: Into<String>, I: Into<String>>(resource_type: T, identifier: I) -> Self {
        Self::Conflict {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
        }
    }

    /// 创建锁等待超时错误
    pub fn lock_timeout<T: Into<String>>(domain: T, timeout_seconds: u64) -> Self {
        Self::LockTimeout {
            domain: domain.into(),
            timeout_seconds,
        }
    }

    /// 创建 IO 错误
    pub fn io<T: Into<String>>(message: T, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// 创建序列化错误
    pub fn serialization<T: Into<String>>(message: T, source: anyhow::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// 创建文件产出错误
    pub fn document<T: Into<String>>(message: T) -> Self {
        Self::Document {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的文件产出错误
    pub fn document_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Document {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建内部错误
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的内部错误
    pub fn internal_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 错误分类，客户端错误不携带诊断堆栈
    #[must_use]
    pub fn category(&self) -> super::ErrorCategory {
        match self {
            Self::Validation { .. }
            | Self::Auth { .. }
            | Self::Permission { .. }
            | Self::Business { .. }
            | Self::NotFound { .. }
            | Self::Conflict { .. }
            | Self::LockTimeout { .. } => super::ErrorCategory::Client,
            Self::Config { .. }
            | Self::Database { .. }
            | Self::Io { .. }
            | Self::Serialization { .. }
            | Self::Document { .. }
            | Self::Internal { .. } => super::ErrorCategory::Server,
            Self::Context { source, .. } => source.category(),
        }
    }
}

impl From<sea_orm::DbErr> for SiteLogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::database_with_source("查询执行失败", err)
    }
}

impl From<serde_json::Error> for SiteLogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON 处理失败".to_string(),
            source: err.into(),
        }
    }
}

impl From<std::io::Error> for SiteLogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<toml::de::Error> for SiteLogError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("配置文件解析失败", err)
    }
}

impl From<rust_xlsxwriter::XlsxError> for SiteLogError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::document_with_source("试算表写入失败", err)
    }
}
