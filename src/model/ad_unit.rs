// src/model/ad_unit.rs

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::bid::Bid;
use crate::native::schema::{validate_requested_schema, NativeParams};

/// 广告位配置。
///
/// native 配置以原始 JSON 保存，第一次访问时解析校验并缓存，之后不再变化。
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdUnit {
    pub code: String,
    #[serde(default)]
    pub media_types: MediaTypes,
    /// 显式的 nativeParams，优先于 mediaTypes.native
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_params: Option<Value>,
    #[serde(default)]
    pub bids: Vec<BidderRef>,
    #[serde(skip)]
    native_detail: OnceCell<Option<NativeParams>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MediaTypes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Value>,
}

/// 广告位上配置的出价方
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BidderRef {
    pub bidder: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl AdUnit {
    /// 只有 native 配置的广告位
    pub fn native(code: &str, native_params: Value) -> Self {
        Self {
            code: code.to_string(),
            media_types: MediaTypes {
                native: Some(native_params),
                ..MediaTypes::default()
            },
            native_params: None,
            bids: Vec::new(),
            native_detail: OnceCell::new(),
        }
    }

    pub fn with_bidders(mut self, bidders: &[&str]) -> Self {
        self.bids = bidders
            .iter()
            .map(|bidder| BidderRef {
                bidder: bidder.to_string(),
                params: Value::Null,
            })
            .collect();
        self
    }

    pub fn raw_native_params(&self) -> Option<&Value> {
        self.native_params.as_ref().or(self.media_types.native.as_ref())
    }

    /// 解析后的 native 配置；配置缺失或校验失败时为 `None`
    pub fn native_params(&self) -> Option<&NativeParams> {
        self.native_detail
            .get_or_init(|| self.raw_native_params().and_then(validate_requested_schema))
            .as_ref()
    }
}

/// **广告位索引**（由宿主竞价组件提供）
pub trait AdUnitIndex: Send + Sync {
    fn get_ad_unit(&self, bid: &Bid) -> Option<&AdUnit>;
}

impl AdUnitIndex for Vec<AdUnit> {
    fn get_ad_unit(&self, bid: &Bid) -> Option<&AdUnit> {
        self.iter().find(|ad_unit| ad_unit.code == bid.ad_unit_code)
    }
}
