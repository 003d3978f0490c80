//! # 错误处理测试

use crate::error::{Context, ErrorCategory, SiteLogError};
use std::error::Error;

#[test]
fn test_config_error_creation() {
    let err = SiteLogError::config("测试配置错误");
    assert!(matches!(err, SiteLogError::Config { .. }));
    assert_eq!(err.to_string(), "配置错误: 测试配置错误");
}

#[test]
fn test_config_error_with_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "文件不存在");
    let err = SiteLogError::config_with_source("配置文件加载失败", io_err);

    assert!(matches!(err, SiteLogError::Config { .. }));
    assert!(err.to_string().contains("配置错误: 配置文件加载失败"));
    assert!(err.source().is_some());
}

#[test]
fn test_business_error() {
    let err = SiteLogError::business("狀態備註不得為空");
    assert!(matches!(err, SiteLogError::Business { .. }));
    assert_eq!(err.to_string(), "业务错误: 狀態備註不得為空");
}

#[test]
fn test_lock_timeout_error() {
    let err = SiteLogError::lock_timeout("logs", 30);
    assert!(matches!(err, SiteLogError::LockTimeout { .. }));
    assert!(err.to_string().contains("logs"));
    assert!(err.to_string().contains("30"));
    assert_eq!(err.category(), ErrorCategory::Client);
}

#[test]
fn test_error_context_trait() {
    let result: std::result::Result<(), sea_orm::DbErr> =
        Err(sea_orm::DbErr::Custom("连接中断".to_string()));

    let err = result.context("读取工程列表失败").unwrap_err();
    assert!(matches!(err, SiteLogError::Context { .. }));
    assert_eq!(err.to_string(), "读取工程列表失败");
    assert!(err.source().is_some());
}

#[test]
fn test_context_preserves_category() {
    // 包装后的错误沿用来源的分类
    let db_err: SiteLogError = sea_orm::DbErr::Custom("连接中断".to_string()).into();
    assert_eq!(db_err.category(), ErrorCategory::Server);

    let wrapped: crate::error::Result<()> =
        Err(db_err).context("读取假日行事历失败");
    assert_eq!(wrapped.unwrap_err().category(), ErrorCategory::Server);

    let biz = SiteLogError::business("重复填报");
    assert_eq!(biz.category(), ErrorCategory::Client);
}

#[test]
fn test_auto_conversion_from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "文件不存在");
    let app_err: SiteLogError = io_err.into();

    assert!(matches!(app_err, SiteLogError::Io { .. }));
    assert_eq!(app_err.category(), ErrorCategory::Server);
}

#[test]
fn test_auto_conversion_from_serde_error() {
    let bad_json = "{not json";
    let json_err = serde_json::from_str::<serde_json::Value>(bad_json).unwrap_err();
    let app_err: SiteLogError = json_err.into();

    assert!(matches!(app_err, SiteLogError::Serialization { .. }));
    assert!(app_err.to_string().contains("序列化错误"));
}

#[test]
fn test_validation_error_with_field() {
    let err = SiteLogError::validation_field("工程序號不得為空", "projectSeqNo");
    if let SiteLogError::Validation { field, .. } = &err {
        assert_eq!(field.as_deref(), Some("projectSeqNo"));
    } else {
        panic!("应为验证错误");
    }
}

#[test]
fn test_error_macros() {
    let err = crate::business_error!("工程 {} 不存在", "P999");
    assert_eq!(err.to_string(), "业务错误: 工程 P999 不存在");

    let err = crate::permission_error!("權限不足");
    assert!(matches!(err, SiteLogError::Permission { .. }));

    fn guarded(flag: bool) -> crate::error::Result<()> {
        crate::ensure_business!(flag, "条件不成立");
        Ok(())
    }
    assert!(guarded(true).is_ok());
    assert!(guarded(false).is_err());
}
