// src/native/value.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// 出价返回的单个素材值。
///
/// 素材可能是纯文本、数字，也可能是 `{url, width, height}` 这样的对象；
/// 输出时只需要 url 或原值。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "Value", into = "Value")]
pub enum AssetValue {
    Empty,
    Flag(bool),
    Number(Number),
    Text(String),
    List(Vec<Value>),
    /// 图片、图标等对象形式的素材
    Media(Map<String, Value>),
}

impl From<Value> for AssetValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AssetValue::Empty,
            Value::Bool(b) => AssetValue::Flag(b),
            Value::Number(n) => AssetValue::Number(n),
            Value::String(s) => AssetValue::Text(s),
            Value::Array(items) => AssetValue::List(items),
            Value::Object(map) => AssetValue::Media(map),
        }
    }
}

impl From<AssetValue> for Value {
    fn from(value: AssetValue) -> Self {
        match value {
            AssetValue::Empty => Value::Null,
            AssetValue::Flag(b) => Value::Bool(b),
            AssetValue::Number(n) => Value::Number(n),
            AssetValue::Text(s) => Value::String(s),
            AssetValue::List(items) => Value::Array(items),
            AssetValue::Media(map) => Value::Object(map),
        }
    }
}

impl From<&str> for AssetValue {
    fn from(s: &str) -> Self {
        AssetValue::Text(s.to_string())
    }
}

impl AssetValue {
    /// 与页面脚本一致的真值判断：空串、0、false、null 为假
    pub fn is_truthy(&self) -> bool {
        match self {
            AssetValue::Empty => false,
            AssetValue::Flag(b) => *b,
            AssetValue::Number(n) => json_truthy(&Value::Number(n.clone())),
            AssetValue::Text(s) => !s.is_empty(),
            AssetValue::List(_) | AssetValue::Media(_) => true,
        }
    }

    /// 对象素材的 url 字段（非空时）
    pub fn url(&self) -> Option<&str> {
        match self {
            AssetValue::Media(map) => map
                .get("url")
                .and_then(Value::as_str)
                .filter(|url| !url.is_empty()),
            _ => None,
        }
    }

    /// 归一化为可直接输出的值：对象取 url，其余原样返回
    pub fn resolve(&self) -> AssetValue {
        match self.url() {
            Some(url) => AssetValue::Text(url.to_string()),
            None => self.clone(),
        }
    }

    /// 归一化后非空的值
    pub fn resolved(&self) -> Option<AssetValue> {
        Some(self.resolve()).filter(AssetValue::is_truthy)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AssetValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 字符串列表（trackers 等），忽略非字符串元素
    pub fn string_list(&self) -> Vec<String> {
        match self {
            AssetValue::List(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            AssetValue::Text(s) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

/// 对任意 JSON 值做同样的真值判断
pub fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
