// src/native/message.rs

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::bid::NativePayload;
use crate::native::keys;
use crate::native::trackers::{select_trackers, TrackerEvent, TrackerPlan};
use crate::native::value::AssetValue;
use crate::openrtb::native_response::NativeResponse;

pub const ASSET_RESPONSE: &str = "assetResponse";

/// 渲染端（跨域 iframe）发来的消息，按 `action` 区分
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum NativeMessage {
    /// 按 targeting key 请求部分素材
    #[serde(rename_all = "camelCase")]
    AssetRequest {
        ad_id: String,
        #[serde(default)]
        assets: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    AllAssetRequest { ad_id: String },
    #[serde(rename_all = "camelCase")]
    Click { ad_id: String },
    #[serde(rename_all = "camelCase")]
    Impression { ad_id: String },
}

impl NativeMessage {
    pub fn ad_id(&self) -> &str {
        match self {
            NativeMessage::AssetRequest { ad_id, .. }
            | NativeMessage::AllAssetRequest { ad_id }
            | NativeMessage::Click { ad_id }
            | NativeMessage::Impression { ad_id } => ad_id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AssetEntry {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AssetValue>,
}

/// 回给渲染端的素材消息
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetMessage {
    pub message: String,
    pub ad_id: String,
    #[serde(default)]
    pub assets: Vec<AssetEntry>,
    /// OpenRTB 形态的素材原样透传
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ortb: Option<NativeResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_template: Option<AssetValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer_url: Option<AssetValue>,
}

impl AssetMessage {
    pub fn new(ad_id: &str) -> Self {
        Self {
            message: ASSET_RESPONSE.to_string(),
            ad_id: ad_id.to_string(),
            assets: Vec::new(),
            ortb: None,
            ad_template: None,
            renderer_url: None,
        }
    }

    fn push(&mut self, key: &str, value: Option<AssetValue>) {
        self.assets.push(AssetEntry {
            key: key.to_string(),
            value,
        });
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NativeReply {
    Assets(AssetMessage),
    Trackers(TrackerPlan),
}

/// **按需返回部分素材**
///
/// `requested` 为固定表中的 targeting key；不在表中的 key 被忽略。
pub fn build_asset_message(ad_id: &str, requested: &[String], native: &NativePayload) -> AssetMessage {
    let mut message = AssetMessage::new(ad_id);
    message.ad_template = native.get("adTemplate").map(AssetValue::resolve);
    message.renderer_url = native.get("rendererUrl").map(AssetValue::resolve);

    for key in requested {
        let Some(asset) = keys::asset_name(key) else {
            debug!(ad_id, key = %key, "requested key is not a native targeting key");
            continue;
        };
        message.push(asset, native.get(asset).map(AssetValue::resolve));
    }
    message
}

/// **返回全部素材**
pub fn build_all_assets_message(ad_id: &str, native: &NativePayload) -> AssetMessage {
    let mut message = AssetMessage::new(ad_id);
    if let Some(ortb) = native.ortb.as_ref() {
        message.ortb = Some(ortb.clone());
        return message;
    }

    for (key, value) in native.assets.iter().filter(|(_, v)| v.is_truthy()) {
        match key.as_str() {
            "adTemplate" => message.ad_template = Some(value.resolve()),
            "rendererUrl" => message.renderer_url = Some(value.resolve()),
            name if keys::is_well_known(name) => message.push(name, Some(value.resolve())),
            _ => {}
        }
    }
    for (key, value) in native.ext.iter().filter(|(_, v)| v.is_truthy()) {
        message.push(key, Some(value.resolve()));
    }
    message
}

/// 根据渲染端消息返回素材或 tracker 计划
pub fn handle_native_message(message: &NativeMessage, native: &NativePayload) -> NativeReply {
    match message {
        NativeMessage::AssetRequest { ad_id, assets } => {
            NativeReply::Assets(build_asset_message(ad_id, assets, native))
        }
        NativeMessage::AllAssetRequest { ad_id } => NativeReply::Assets(build_all_assets_message(ad_id, native)),
        NativeMessage::Click { .. } => NativeReply::Trackers(select_trackers(TrackerEvent::Click, native)),
        NativeMessage::Impression { .. } => {
            NativeReply::Trackers(select_trackers(TrackerEvent::Impression, native))
        }
    }
}
