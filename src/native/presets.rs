// src/native/presets.rs

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;

/// 支持的预设类型：`{type: "image"}` 会被整体替换为对应的完整配置
static SUPPORTED_TYPES: Lazy<HashMap<&'static str, Value>> = Lazy::new(|| {
    let mut types = HashMap::new();
    types.insert(
        "image",
        json!({
            "ortb": {
                "ver": "1.2",
                "assets": [
                    {"required": 1, "id": 1, "img": {"type": 3, "wmin": 100, "hmin": 100}},
                    {"required": 1, "id": 2, "title": {"len": 140}},
                    {"required": 1, "id": 3, "data": {"type": 1}},
                    {"required": 0, "id": 4, "data": {"type": 2}},
                    {"required": 0, "id": 5, "img": {"type": 1, "wmin": 20, "hmin": 20}}
                ]
            },
            "image": {"required": true},
            "title": {"required": true},
            "sponsoredBy": {"required": true},
            "clickUrl": {"required": true},
            "body": {"required": false},
            "icon": {"required": false}
        }),
    );
    types
});

pub fn preset(type_name: &str) -> Option<&'static Value> {
    SUPPORTED_TYPES.get(type_name)
}

pub fn is_supported(type_name: &str) -> bool {
    SUPPORTED_TYPES.contains_key(type_name)
}
