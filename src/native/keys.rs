// src/native/keys.rs

use std::collections::BTreeMap;

use crate::native::schema::NativeParams;

/// 逻辑素材名 → targeting key。
///
/// 广告服务器按这些字面量匹配宏，版本之间不能改动。
pub const NATIVE_KEYS: &[(&str, &str)] = &[
    ("title", "hb_native_title"),
    ("body", "hb_native_body"),
    ("body2", "hb_native_body2"),
    ("privacyLink", "hb_native_privacy"),
    ("privacyIcon", "hb_native_privicon"),
    ("sponsoredBy", "hb_native_brand"),
    ("image", "hb_native_image"),
    ("icon", "hb_native_icon"),
    ("clickUrl", "hb_native_linkurl"),
    ("displayUrl", "hb_native_displayurl"),
    ("cta", "hb_native_cta"),
    ("rating", "hb_native_rating"),
    ("address", "hb_native_address"),
    ("downloads", "hb_native_downloads"),
    ("likes", "hb_native_likes"),
    ("phone", "hb_native_phone"),
    ("price", "hb_native_price"),
    ("salePrice", "hb_native_saleprice"),
    ("rendererUrl", "hb_renderer_url"),
    ("adTemplate", "hb_adTemplate"),
];

/// 扩展素材的 key 前缀
pub const EXT_KEY_PREFIX: &str = "hb_native_";

pub type TargetingKeyMap = BTreeMap<String, String>;

/// 固定表中的 targeting key
pub fn targeting_key(asset: &str) -> Option<&'static str> {
    NATIVE_KEYS
        .iter()
        .find(|(name, _)| *name == asset)
        .map(|(_, key)| *key)
}

/// 反查：targeting key → 逻辑素材名（仅固定表）
pub fn asset_name(key: &str) -> Option<&'static str> {
    NATIVE_KEYS
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(name, _)| *name)
}

pub fn is_well_known(asset: &str) -> bool {
    targeting_key(asset).is_some()
}

/// **构造广告位的 key 映射**
///
/// 先放入固定表，再叠加广告位 `ext` 中声明的扩展素材（`hb_native_<name>`）。
/// 扩展名与固定表冲突时以扩展为准。
pub fn build_key_map(params: Option<&NativeParams>) -> TargetingKeyMap {
    let mut keys: TargetingKeyMap = NATIVE_KEYS
        .iter()
        .map(|(name, key)| (name.to_string(), key.to_string()))
        .collect();

    if let Some(params) = params {
        for name in params.ext.keys() {
            keys.insert(name.clone(), format!("{}{}", EXT_KEY_PREFIX, name));
        }
    }
    keys
}
