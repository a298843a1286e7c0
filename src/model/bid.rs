// src/model/bid.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::native::value::AssetValue;
use crate::openrtb::native_response::NativeResponse;

/// 出价适配器解析后的出价（只保留 native 处理需要的字段）
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    /// 占位符 `<key>:<adId>` 中使用的广告 id
    pub ad_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// 用于在广告位索引中查找对应广告位
    pub ad_unit_code: String,
    #[serde(default)]
    pub bidder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<NativePayload>,
}

/// 出价返回的 native 素材包。
///
/// `ortb` 为 OpenRTB 形态；其余键（clickUrl、title、image、clickTrackers ...）
/// 全部平铺在 `assets` 中，`ext` 为厂商扩展素材。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NativePayload {
    /// 形状不合法的 `ortb` 视为缺失，按旧版规则校验
    #[serde(
        default,
        alias = "ortb2",
        deserialize_with = "crate::openrtb::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub ortb: Option<NativeResponse>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ext: BTreeMap<String, AssetValue>,
    #[serde(flatten)]
    pub assets: BTreeMap<String, AssetValue>,
}

impl NativePayload {
    pub fn get(&self, asset: &str) -> Option<&AssetValue> {
        self.assets.get(asset)
    }

    /// 归一化后的素材值：先取顶层，再取 ext；空值视为不存在
    pub fn value_of(&self, asset: &str) -> Option<AssetValue> {
        self.assets
            .get(asset)
            .and_then(AssetValue::resolved)
            .or_else(|| self.ext.get(asset).and_then(AssetValue::resolved))
    }

    /// 顶层键的值为真
    pub fn has_truthy(&self, asset: &str) -> bool {
        self.assets.get(asset).map_or(false, AssetValue::is_truthy)
    }

    pub fn click_url(&self) -> Option<&AssetValue> {
        self.assets.get("clickUrl").filter(|v| v.is_truthy())
    }
}

impl Bid {
    pub fn native(ad_id: &str, ad_unit_code: &str, native: NativePayload) -> Self {
        Self {
            ad_id: ad_id.to_string(),
            request_id: None,
            ad_unit_code: ad_unit_code.to_string(),
            bidder: String::new(),
            media_type: Some("native".to_string()),
            native: Some(native),
        }
    }
}
