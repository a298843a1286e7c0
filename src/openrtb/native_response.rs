// src/openrtb/native_response.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::{lenient, lenient_list};

/// OpenRTB Native 1.2 响应（出价方返回的素材）。
///
/// 出价方的数据不可信：类型不符的字段按缺失处理，由后续校验给出诊断。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NativeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ver: Option<Value>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub assets: Vec<ResponseAsset>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub imptrackers: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub eventtrackers: Vec<EventTracker>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub jstracker: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 落地页信息
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Link {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub clicktrackers: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 返回素材：只关心 id，其余内容透传
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ResponseAsset {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub id: Value,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

/// event: 1 = impression；method: 1 = img 像素, 2 = js。
/// 交易所自定义编码（500+）照常保留。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EventTracker {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub event: Option<u64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub method: Option<u64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NativeResponse {
    pub fn landing_url(&self) -> Option<&str> {
        self.link
            .as_ref()
            .and_then(|link| link.url.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// 返回的素材 id；非整数 id 视为未返回
    pub fn returned_asset_ids(&self) -> BTreeSet<u64> {
        self.assets.iter().filter_map(|asset| asset.id.as_u64()).collect()
    }
}

impl EventTracker {
    pub fn is(&self, event: u64, method: u64) -> bool {
        self.event == Some(event) && self.method == Some(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> NativeResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn null_tracker_lists_are_empty() {
        let response = parse(json!({
            "link": {"url": "https://x", "clicktrackers": null},
            "assets": [{"id": 1}],
            "imptrackers": null,
            "eventtrackers": null,
            "jstracker": null
        }));
        assert!(response.imptrackers.is_empty());
        assert!(response.eventtrackers.is_empty());
        assert!(response.link.as_ref().unwrap().clicktrackers.is_empty());
        assert_eq!(response.landing_url(), Some("https://x"));
    }

    #[test]
    fn non_integer_asset_ids_count_as_absent() {
        let response = parse(json!({
            "assets": [{"id": "1"}, {"id": 2.5}, {"title": {"text": "T"}}, {"id": 3}, "junk"]
        }));
        assert_eq!(response.assets.len(), 4);
        assert_eq!(response.returned_asset_ids(), BTreeSet::from([3]));
    }

    #[test]
    fn custom_event_codes_are_kept() {
        let response = parse(json!({
            "eventtrackers": [
                {"event": 500, "method": 1, "url": "https://custom"},
                {"event": 1, "method": 600, "url": "https://other"},
                {"event": "1", "method": 1, "url": "https://odd"},
                {"event": 1, "method": 1, "url": "https://imp"}
            ]
        }));
        assert_eq!(response.eventtrackers.len(), 4);
        assert_eq!(response.eventtrackers[0].event, Some(500));
        assert_eq!(response.eventtrackers[2].event, None);
        let imps: Vec<_> = response.eventtrackers.iter().filter(|t| t.is(1, 1)).collect();
        assert_eq!(imps.len(), 1);
    }

    #[test]
    fn odd_link_shapes_leave_no_landing_url() {
        assert_eq!(parse(json!({"link": {"url": 5}})).landing_url(), None);
        assert_eq!(parse(json!({"link": "https://x"})).landing_url(), None);
        assert_eq!(parse(json!({"link": {"url": ""}})).landing_url(), None);
    }
}
