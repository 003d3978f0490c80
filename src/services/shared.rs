//! # 服务层共享类型与工具

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{Result, SiteLogError};

/// 服务层统一回传:资料本体加上可选的提示消息
#[derive(Debug, Clone)]
pub struct ServiceResponse<T> {
    pub data: T,
    pub message: Option<String>,
}

impl<T> ServiceResponse<T> {
    pub const fn new(data: T) -> Self {
        Self { data, message: None }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

/// 解析 `YYYY-MM-DD` 日期字符串
pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        SiteLogError::validation_field(format!("日期格式錯誤: {field} 應為 YYYY-MM-DD"), field)
    })
}

/// 编号列表兼容数字与字符串两种元素形态
///
/// 前端多选框取出的 option value 是字符串，旧资料则存数字。
pub fn parse_id_list(value: &Value, field: &str) -> Result<Vec<i32>> {
    let Value::Array(items) = value else {
        return Err(SiteLogError::validation_field(
            format!("参数 {field} 应为数组"),
            field,
        ));
    };
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let id = match item {
            Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
            Value::String(s) => s.trim().parse::<i32>().ok(),
            _ => None,
        };
        match id {
            Some(id) => ids.push(id),
            None => {
                return Err(SiteLogError::validation_field(
                    format!("参数 {field} 含无效编号: {item}"),
                    field,
                ));
            }
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-06-15", "logDate").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert!(parse_date("2024/06/15", "logDate").is_err());
        assert!(parse_date("not-a-date", "logDate").is_err());
    }

    #[test]
    fn test_parse_id_list_mixed_forms() {
        assert_eq!(parse_id_list(&json!([1, 2, 3]), "ids").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list(&json!(["1", "3"]), "ids").unwrap(), vec![1, 3]);
        assert_eq!(parse_id_list(&json!([]), "ids").unwrap(), Vec::<i32>::new());
        assert!(parse_id_list(&json!(["abc"]), "ids").is_err());
        assert!(parse_id_list(&json!("1,2"), "ids").is_err());
    }
}
