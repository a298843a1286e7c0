// src/native/schema.rs

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{error, warn};

use crate::native::error::NativeError;
use crate::native::presets;
use crate::native::value::{json_truthy, AssetValue};
use crate::openrtb::native_request::NativeRequest;

/// 单个具名素材的需求（旧版扁平配置）
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
    pub required: bool,
    /// 用占位符代替真实值输出，渲染时再按 adId 查询
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_id: Option<bool>,
    /// 覆盖全局 sendTargetingKeys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_targeting_keys: Option<bool>,
    /// sizes、len 等其余字段
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AssetRequest {
    fn from_object(object: &Map<String, Value>) -> Self {
        let mut extra = object.clone();
        let required = extra.remove("required").map_or(false, |v| json_truthy(&v));
        // 只有布尔值才算显式设置
        let send_id = extra.remove("sendId").and_then(|v| v.as_bool());
        let send_targeting_keys = extra.remove("sendTargetingKeys").and_then(|v| v.as_bool());
        Self {
            required,
            send_id,
            send_targeting_keys,
            extra,
        }
    }
}

/// 广告位解析后的 native 配置。
///
/// `ortb` 存在即为 OpenRTB 形态；旧版的具名素材与全局开关始终保留，
/// 预设类型会同时带上两种形态。
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NativeParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ortb: Option<NativeRequest>,
    #[serde(flatten)]
    pub assets: BTreeMap<String, AssetRequest>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ext: BTreeMap<String, AssetRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer_url: Option<AssetValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_template: Option<AssetValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_targeting_keys: Option<bool>,
}

impl NativeParams {
    /// 从原始 JSON 构造；`ortb` 段必须先通过 OpenRTB 校验
    pub fn from_json(params: &Value) -> Result<Self, NativeError> {
        let object = params
            .as_object()
            .ok_or_else(|| NativeError::malformed(format!("native params must be an object, got {}", params)))?;

        let mut native = NativeParams::default();
        for (name, value) in object {
            match name.as_str() {
                // 值为假（null、false ...）时不算 OpenRTB 形态
                "ortb" | "ortb2" if !json_truthy(value) => {}
                "ortb" | "ortb2" => {
                    check_open_rtb_request(value)?;
                    let request = serde_json::from_value::<NativeRequest>(value.clone())
                        .map_err(|e| NativeError::malformed(format!("ortb: {}", e)))?;
                    native.ortb = Some(request);
                }
                "ext" => {
                    let ext = value
                        .as_object()
                        .ok_or_else(|| NativeError::malformed("ext must be an object"))?;
                    native.ext = ext
                        .iter()
                        .map(|(ext_name, req)| {
                            let req = req.as_object().map(AssetRequest::from_object).unwrap_or_default();
                            (ext_name.clone(), req)
                        })
                        .collect();
                }
                "rendererUrl" => native.renderer_url = Some(AssetValue::from(value.clone())),
                "adTemplate" => native.ad_template = Some(AssetValue::from(value.clone())),
                "sendTargetingKeys" => native.send_targeting_keys = value.as_bool(),
                // 非对象字段（type、sizes 等）不是素材
                _ => {
                    if let Some(req) = value.as_object() {
                        native.assets.insert(name.clone(), AssetRequest::from_object(req));
                    }
                }
            }
        }
        Ok(native)
    }

    pub fn is_ortb(&self) -> bool {
        self.ortb.is_some()
    }

    /// 全局 sendTargetingKeys：只有显式 false 才关闭
    pub fn global_send_targeting_keys(&self) -> bool {
        self.send_targeting_keys != Some(false)
    }

    /// 旧版配置中标记为 required 的素材名
    pub fn required_assets(&self) -> impl Iterator<Item = &str> {
        self.assets
            .iter()
            .filter(|(_, req)| req.required)
            .map(|(name, _)| name.as_str())
    }

    /// 素材级开关：先查顶层配置，再查 ext
    fn asset_flag(&self, asset: &str, flag: impl Fn(&AssetRequest) -> Option<bool>) -> Option<bool> {
        self.assets
            .get(asset)
            .and_then(&flag)
            .or_else(|| self.ext.get(asset).and_then(&flag))
    }

    pub fn send_id(&self, asset: &str) -> bool {
        self.asset_flag(asset, |req| req.send_id).unwrap_or(false)
    }

    pub fn send_targeting_keys_for(&self, asset: &str) -> bool {
        self.asset_flag(asset, |req| req.send_targeting_keys)
            .unwrap_or_else(|| self.global_send_targeting_keys())
    }
}

/// **预设类型替换**
///
/// `type` 为支持的预设时返回预设配置（丢弃调用方的其他字段）；
/// 不支持的类型记录诊断后原样返回。
pub fn process_native_ad_unit_params(params: &Value) -> Value {
    let Some(type_value) = params.get("type").filter(|t| json_truthy(t)) else {
        return params.clone();
    };

    match type_value.as_str().and_then(presets::preset) {
        Some(preset) => preset.clone(),
        None => {
            let name = type_value.as_str().map(str::to_string).unwrap_or_else(|| type_value.to_string());
            let err = NativeError::UnsupportedPresetType(name);
            error!(kind = err.kind(), "{}", err);
            params.clone()
        }
    }
}

/// **解析并校验广告位的 native 配置**
///
/// 返回 `None` 表示整个 native 配置作废，调用方应把广告位当作非 native。
pub fn validate_requested_schema(params: &Value) -> Option<NativeParams> {
    let resolved = process_native_ad_unit_params(params);
    match NativeParams::from_json(&resolved) {
        Ok(native) => Some(native),
        Err(err) => {
            error!(kind = err.kind(), "{}", err);
            None
        }
    }
}

/// OpenRTB native 请求是否合法（失败时记录原因）
pub fn is_open_rtb_bid_request_valid(ortb: &Value) -> bool {
    match check_open_rtb_request(ortb) {
        Ok(()) => true,
        Err(err) => {
            error!(kind = err.kind(), "{}", err);
            false
        }
    }
}

/// 按顺序检查，遇到第一个失败即返回
pub fn check_open_rtb_request(ortb: &Value) -> Result<(), NativeError> {
    let assets = ortb
        .get("assets")
        .and_then(Value::as_array)
        .filter(|assets| !assets.is_empty())
        .ok_or_else(|| {
            NativeError::malformed(format!(
                "assets in mediaTypes.native.ortb is not an array, or it's empty. Assets: {}",
                ortb.get("assets").unwrap_or(&Value::Null)
            ))
        })?;

    let mut ids = BTreeSet::new();
    for asset in assets {
        let unique = asset
            .get("id")
            .and_then(Value::as_u64)
            .map_or(false, |id| ids.insert(id));
        if !unique {
            return Err(NativeError::malformed(
                "each asset object must have 'id' property, it must be unique and it must be an integer",
            ));
        }
    }

    if let Some(trackers) = ortb.get("eventtrackers") {
        if !trackers.is_array() {
            return Err(NativeError::malformed(format!(
                "ortb.eventtrackers is not an array. Eventtrackers: {}",
                trackers
            )));
        }
    }

    assets.iter().try_for_each(check_open_rtb_asset)
}

fn check_open_rtb_asset(asset: &Value) -> Result<(), NativeError> {
    let object = asset
        .as_object()
        .ok_or_else(|| NativeError::malformed(format!("asset must be an object: {}", asset)))?;
    let part = |name: &str| object.get(name).filter(|v| json_truthy(v));
    let is_number = |v: &Value, field: &str| v.get(field).map_or(false, Value::is_number);
    let is_array = |v: &Value, field: &str| v.get(field).map_or(false, Value::is_array);

    if let Some(img) = part("img") {
        if !is_number(img, "w") && !is_number(img, "wmin") {
            return Err(NativeError::malformed("for img asset there must be 'w' or 'wmin' property"));
        }
        if !is_number(img, "h") && !is_number(img, "hmin") {
            return Err(NativeError::malformed("for img asset there must be 'h' or 'hmin' property"));
        }
    } else if let Some(title) = part("title") {
        if !is_number(title, "len") {
            return Err(NativeError::malformed("for title asset there must be 'len' property defined"));
        }
    } else if let Some(data) = part("data") {
        if !is_number(data, "type") {
            return Err(NativeError::malformed("for data asset 'type' property must be a number"));
        }
    } else if let Some(video) = part("video") {
        if !is_array(video, "mimes")
            || !is_array(video, "protocols")
            || !is_number(video, "minduration")
            || !is_number(video, "maxduration")
        {
            return Err(NativeError::malformed("video asset is not properly configured"));
        }
    } else {
        warn!(asset = %asset, "unknown native asset type, accepted without validation");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ortb(assets: Value) -> Value {
        json!({"ver": "1.2", "assets": assets})
    }

    #[test]
    fn image_type_is_replaced_by_preset() {
        let resolved = process_native_ad_unit_params(&json!({"type": "image", "title": {"required": false}}));
        for key in ["ortb", "image", "title", "sponsoredBy", "clickUrl"] {
            assert!(resolved.get(key).is_some(), "missing {}", key);
        }
        assert!(resolved["ortb"]["assets"].is_array());
        assert_eq!(resolved["title"]["required"], true);
    }

    #[test]
    fn unknown_type_is_returned_unchanged() {
        let params = json!({"type": "unknown", "title": {"required": true}});
        assert_eq!(process_native_ad_unit_params(&params), params);
    }

    #[test]
    fn preset_schema_validates() {
        let native = validate_requested_schema(&json!({"type": "image"})).unwrap();
        let request = native.ortb.as_ref().unwrap();
        assert_eq!(request.assets.len(), 5);
        assert_eq!(request.required_asset_ids(), vec![1, 2, 3]);
        assert!(native.assets["sponsoredBy"].required);
        assert!(!native.assets["icon"].required);
    }

    #[test]
    fn legacy_params_are_split_into_parts() {
        let native = validate_requested_schema(&json!({
            "title": {"required": true, "len": 80, "sendId": true},
            "image": {"required": 1, "sizes": [150, 50]},
            "body": {"sendTargetingKeys": "yes"},
            "ext": {"foo": {"required": false, "sendTargetingKeys": false}},
            "rendererUrl": "https://renderer.example/r.js",
            "sendTargetingKeys": false,
            "sizes": [300, 250]
        }))
        .unwrap();

        assert!(!native.is_ortb());
        assert!(native.assets["title"].required);
        assert_eq!(native.assets["title"].extra.get("len"), Some(&json!(80)));
        assert!(native.assets["image"].required);
        assert_eq!(native.assets["body"].send_targeting_keys, None);
        assert!(!native.assets.contains_key("sizes"));
        assert_eq!(native.ext["foo"].send_targeting_keys, Some(false));
        assert_eq!(native.renderer_url.as_ref().and_then(AssetValue::as_str), Some("https://renderer.example/r.js"));
        assert!(!native.global_send_targeting_keys());
        assert_eq!(native.required_assets().collect::<Vec<_>>(), vec!["image", "title"]);
    }

    #[test]
    fn flags_fall_back_from_top_level_to_ext() {
        let native = validate_requested_schema(&json!({
            "title": {"required": true},
            "ext": {"title": {"sendId": true, "sendTargetingKeys": false}}
        }))
        .unwrap();
        assert!(native.send_id("title"));
        assert!(!native.send_targeting_keys_for("title"));
        assert!(native.send_targeting_keys_for("body"));
    }

    #[test]
    fn non_object_params_are_rejected() {
        assert!(validate_requested_schema(&json!("image")).is_none());
        assert!(validate_requested_schema(&json!({"ext": 3})).is_none());
    }

    #[test]
    fn invalid_ortb_section_discards_the_whole_config() {
        let params = json!({"title": {"required": true}, "ortb": ortb(json!([]))});
        assert!(validate_requested_schema(&params).is_none());
    }

    #[test]
    fn falsy_ortb_is_not_a_marker() {
        for falsy in [json!(null), json!(false), json!(0), json!("")] {
            let native = validate_requested_schema(&json!({"title": {"required": true}, "ortb": falsy})).unwrap();
            assert!(!native.is_ortb());
            assert!(native.assets["title"].required);
        }
    }

    #[test]
    fn configs_accepted_by_the_rules_keep_their_ortb_section() {
        let cases = [
            json!({"id": 1, "required": 1, "data": {"type": 500}}),
            json!({"id": 1, "required": 1, "img": {"type": 501, "w": 100.5, "h": 50}}),
            json!({"id": 1, "required": 1, "title": {"len": 90.5}}),
            json!({"id": 1, "required": 1, "video": {"mimes": [1], "protocols": ["x"], "minduration": 0.5, "maxduration": 30}}),
            json!({"id": 1, "required": 1, "img": {"w": 1, "h": 1}, "title": "odd"}),
        ];
        for asset in cases {
            let request = ortb(json!([asset.clone()]));
            assert!(is_open_rtb_bid_request_valid(&request), "{}", asset);
            let native = validate_requested_schema(&json!({"ortb": request})).unwrap_or_else(|| panic!("{}", asset));
            assert_eq!(native.ortb.as_ref().unwrap().required_asset_ids(), vec![1]);
        }
    }

    #[test]
    fn ortb2_key_is_accepted_as_marker() {
        let native = validate_requested_schema(&json!({
            "ortb2": ortb(json!([{"id": 1, "required": 1, "title": {"len": 10}}]))
        }))
        .unwrap();
        assert!(native.is_ortb());
    }

    #[test]
    fn assets_must_be_non_empty_array() {
        assert!(!is_open_rtb_bid_request_valid(&json!({})));
        assert!(!is_open_rtb_bid_request_valid(&ortb(json!([]))));
        assert!(!is_open_rtb_bid_request_valid(&ortb(json!({"id": 1}))));
    }

    #[test]
    fn ids_must_be_unique_integers() {
        let dup = ortb(json!([
            {"id": 1, "title": {"len": 10}},
            {"id": 1, "data": {"type": 1}}
        ]));
        assert!(!is_open_rtb_bid_request_valid(&dup));

        assert!(!is_open_rtb_bid_request_valid(&ortb(json!([{"title": {"len": 10}}]))));
        assert!(!is_open_rtb_bid_request_valid(&ortb(json!([{"id": "1", "title": {"len": 10}}]))));
        assert!(!is_open_rtb_bid_request_valid(&ortb(json!([{"id": 1.5, "title": {"len": 10}}]))));
        assert!(!is_open_rtb_bid_request_valid(&ortb(json!([{"id": -1, "title": {"len": 10}}]))));
    }

    #[test]
    fn eventtrackers_must_be_an_array() {
        let mut request = ortb(json!([{"id": 1, "title": {"len": 10}}]));
        request["eventtrackers"] = json!({"event": 1});
        assert!(!is_open_rtb_bid_request_valid(&request));
        request["eventtrackers"] = json!([{"event": 1, "methods": [1]}]);
        assert!(is_open_rtb_bid_request_valid(&request));
    }

    #[test]
    fn per_type_shapes_are_checked() {
        let cases = [
            (json!({"id": 1, "img": {"w": 100, "h": 100}}), true),
            (json!({"id": 1, "img": {"wmin": 100, "hmin": 50}}), true),
            (json!({"id": 1, "img": {"w": 100}}), false),
            (json!({"id": 1, "img": {"w": "100", "h": 1}}), false),
            (json!({"id": 1, "title": {"len": 140}}), true),
            (json!({"id": 1, "title": {}}), false),
            (json!({"id": 1, "data": {"type": 2}}), true),
            (json!({"id": 1, "data": {"len": 2}}), false),
            (json!({"id": 1, "video": {"mimes": ["video/mp4"], "protocols": [2], "minduration": 1, "maxduration": 30}}), true),
            (json!({"id": 1, "video": {"mimes": ["video/mp4"], "minduration": 1, "maxduration": 30}}), false),
            (json!({"id": 1, "audio": {"anything": true}}), true),
        ];
        for (asset, expected) in cases {
            assert_eq!(is_open_rtb_bid_request_valid(&ortb(json!([asset.clone()]))), expected, "{}", asset);
        }
    }

    #[test]
    fn first_failing_rule_is_reported() {
        let request = json!({
            "assets": [{"id": 1, "title": {}}, {"id": 1, "title": {"len": 1}}],
            "eventtrackers": 5
        });
        let err = check_open_rtb_request(&request).unwrap_err();
        match err {
            NativeError::SchemaMalformed { reason } => assert!(reason.contains("unique"), "{}", reason),
            other => panic!("unexpected {:?}", other),
        }
    }
}
