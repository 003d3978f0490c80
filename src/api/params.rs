//! # 请求参数包
//!
//! 将 query string 与 POST JSON body 合并为单一参数包，body 中的键覆盖同名 query 键。
//! 旧版前端以 `text/plain` 送出 JSON body，因此不依 Content-Type 判断，只要 body 非空
//! 就按 JSON 物件解析，解析失败即拒绝请求。

use crate::error::{Result, SiteLogError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 合并后的请求参数
#[derive(Debug, Default, Clone)]
pub struct ParamBag {
    values: Map<String, Value>,
}

impl ParamBag {
    /// 由 query 参数与原始 body 构造参数包
    ///
    /// body 非空时必须是合法的 JSON 物件，否则回传验证错误。
    pub fn from_request(query: HashMap<String, String>, body: &str) -> Result<Self> {
        let mut values = Map::new();
        for (key, value) in query {
            values.insert(key, Value::String(value));
        }

        let trimmed = body.trim();
        if !trimmed.is_empty() {
            let parsed: Value = serde_json::from_str(trimmed).map_err(|e| {
                SiteLogError::validation(format!("请求 body 不是合法的 JSON: {e}"))
            })?;
            match parsed {
                Value::Object(object) => {
                    for (key, value) in object {
                        values.insert(key, value);
                    }
                }
                _ => {
                    return Err(SiteLogError::validation("请求 body 必须是 JSON 物件"));
                }
            }
        }

        Ok(Self { values })
    }

    /// 仅由键值对构造，测试与内部调用使用
    #[must_use]
    pub fn from_values(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// 原始值
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// 字符串参数，JSON 字符串直接取值，其余标量转为字符串表示
    #[must_use]
    pub fn string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// 必填字符串参数，缺失或空白时回传验证错误
    pub fn require_string(&self, key: &str) -> Result<String> {
        match self.string(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(SiteLogError::validation_field(format!("缺少必要参数: {key}"), key)),
        }
    }

    /// 布尔参数，兼容 query 侧的 `"true"`/`"false"` 字符串
    #[must_use]
    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.values.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// 整数参数，兼容字符串形式的数字
    #[must_use]
    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.values.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// 结构化参数，兼容两种形态:
    /// 直接的 JSON 值，或经过一层字符串编码的 JSON (query 侧传物件时的旧习惯)
    pub fn json_field<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.values.get(key) else {
            return Ok(None);
        };
        if value.is_null() {
            return Ok(None);
        }

        let parsed = if let Value::String(encoded) = value {
            if encoded.trim().is_empty() {
                return Ok(None);
            }
            serde_json::from_str(encoded).map_err(|e| {
                SiteLogError::validation_field(format!("参数 {key} 不是合法的 JSON: {e}"), key)
            })?
        } else {
            serde_json::from_value(value.clone()).map_err(|e| {
                SiteLogError::validation_field(format!("参数 {key} 格式错误: {e}"), key)
            })?
        };
        Ok(Some(parsed))
    }

    /// 必填的结构化参数
    pub fn require_json_field<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.json_field(key)?
            .ok_or_else(|| SiteLogError::validation_field(format!("缺少必要参数: {key}"), key))
    }

    /// 将整个参数包反序列化为载荷结构，多余的键被忽略
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|e| SiteLogError::validation(format!("请求参数格式错误: {e}")))
    }
}
