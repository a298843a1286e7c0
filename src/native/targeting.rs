// src/native/targeting.rs

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::model::ad_unit::AdUnitIndex;
use crate::model::bid::{Bid, NativePayload};
use crate::native::keys::build_key_map;
use crate::native::schema::NativeParams;
use crate::native::value::AssetValue;

/// 模板内容不进入 targeting
const AD_TEMPLATE: &str = "adTemplate";
const RENDERER_URL: &str = "rendererUrl";

pub type KeyValues = BTreeMap<String, AssetValue>;

/// targeting 结果：补充了 rendererUrl/adTemplate 的素材包，以及输出的键值对
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NativeTargeting {
    pub native: NativePayload,
    pub key_values: KeyValues,
}

/// 返回素材包副本，带上广告位配置中的 rendererUrl（优先）或 adTemplate
pub fn augment_native_payload(native: &NativePayload, params: Option<&NativeParams>) -> NativePayload {
    let mut native = native.clone();
    let Some(params) = params else {
        return native;
    };

    let truthy = |value: &&AssetValue| value.is_truthy();
    if let Some(renderer_url) = params.renderer_url.as_ref().filter(truthy) {
        native.assets.insert(RENDERER_URL.to_string(), renderer_url.resolve());
    } else if let Some(ad_template) = params.ad_template.as_ref().filter(truthy) {
        native.assets.insert(AD_TEMPLATE.to_string(), ad_template.resolve());
    }
    native
}

/// **构造出价的 native targeting**
///
/// 遍历顶层与 ext 中的素材，按广告位的 sendId / sendTargetingKeys
/// 决定输出占位符、真实值或不输出。
pub fn build_targeting(bid: &Bid, params: Option<&NativeParams>) -> NativeTargeting {
    let Some(raw) = bid.native.as_ref() else {
        debug!(ad_id = %bid.ad_id, "bid has no native payload, no targeting");
        return NativeTargeting::default();
    };

    let native = augment_native_payload(raw, params);
    let keys = build_key_map(params);
    let send_id = |asset: &str| params.map_or(false, |p| p.send_id(asset));
    let send_targeting = |asset: &str| params.map_or(true, |p| p.send_targeting_keys_for(asset));

    let assets: BTreeSet<&str> = native
        .assets
        .keys()
        .chain(native.ext.keys())
        .map(String::as_str)
        .collect();

    let mut key_values = KeyValues::new();
    for asset in assets {
        if asset == AD_TEMPLATE {
            continue;
        }
        let Some(key) = keys.get(asset) else {
            continue;
        };
        let Some(mut value) = native.value_of(asset) else {
            continue;
        };

        if send_id(asset) {
            value = AssetValue::Text(format!("{}:{}", key, bid.ad_id));
        }
        if send_targeting(asset) {
            key_values.insert(key.clone(), value);
        }
    }

    NativeTargeting { native, key_values }
}

/// 通过广告位索引查找配置后构造 targeting；找不到广告位时只用固定 key 表
pub fn get_native_targeting(bid: &Bid, index: &dyn AdUnitIndex) -> NativeTargeting {
    let params = index.get_ad_unit(bid).and_then(|ad_unit| ad_unit.native_params());
    build_targeting(bid, params)
}
