// src/openrtb/native_request.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::lenient;

/// OpenRTB Native 1.2 请求（广告位声明的素材需求）。
///
/// 形状由 `check_open_rtb_request` 负责校验，这里只强类型化 `id` 与 `required`，
/// 其余字段保持数值 / JSON 原样，交易所自定义的 type（500+）、小数宽高都能通过。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NativeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ver: Option<Value>,
    pub assets: Vec<RequestAsset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eventtrackers: Option<Vec<Value>>,
    /// 其余字段原样保留（context、plcmttype 等）
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 单个素材槽位：id 唯一，required 为 1 时必须返回
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RequestAsset {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub required: Value,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub img: Option<ImageAsset>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleAsset>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub data: Option<DataAsset>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoAsset>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageAsset {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub img_type: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wmin: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmin: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TitleAsset {
    pub len: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DataAsset {
    #[serde(rename = "type")]
    pub data_type: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub len: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VideoAsset {
    pub mimes: Vec<Value>,
    pub protocols: Vec<Value>,
    pub minduration: Number,
    pub maxduration: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestAsset {
    pub fn is_required(&self) -> bool {
        self.required.as_u64() == Some(1)
    }
}

impl NativeRequest {
    /// 所有 required == 1 的素材 id
    pub fn required_asset_ids(&self) -> Vec<u64> {
        self.assets
            .iter()
            .filter(|asset| asset.is_required())
            .map(|asset| asset.id)
            .collect()
    }
}
