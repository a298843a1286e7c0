//! Native 素材处理的错误类型
//!
//! 这些错误都不会越过素材处理边界：调用方记录诊断日志后，把广告位当作
//! "未请求 native"，或把出价当作无效，竞价流程继续。

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NativeError {
    /// 广告位的素材配置结构不合法（缺 id、id 重复、字段类型错误等）
    #[error("native schema malformed: {reason}")]
    SchemaMalformed { reason: String },

    /// 出价返回的素材不满足广告位要求，或缺少落地页
    #[error("native bid {ad_id} does not conform: {reason}")]
    BidNonConforming {
        ad_id: String,
        reason: String,
        missing_ids: Vec<u64>,
    },

    /// 预设类型不在支持列表中
    #[error("{0} nativeParam is not supported")]
    UnsupportedPresetType(String),

    #[error("ad unit not found for bid {ad_id} (adUnitCode={ad_unit_code})")]
    AdUnitNotFound { ad_id: String, ad_unit_code: String },

    #[error("bidder {0} is not a native bidder")]
    NotNativeBidder(String),
}

impl NativeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        NativeError::SchemaMalformed {
            reason: reason.into(),
        }
    }

    pub fn non_conforming(ad_id: &str, reason: impl Into<String>) -> Self {
        NativeError::BidNonConforming {
            ad_id: ad_id.to_string(),
            reason: reason.into(),
            missing_ids: Vec::new(),
        }
    }

    /// 诊断日志里使用的错误种类名
    pub fn kind(&self) -> &'static str {
        match self {
            NativeError::SchemaMalformed { .. } => "schema_malformed",
            NativeError::BidNonConforming { .. } => "bid_non_conforming",
            NativeError::UnsupportedPresetType(_) => "unsupported_preset_type",
            NativeError::AdUnitNotFound { .. } => "ad_unit_not_found",
            NativeError::NotNativeBidder(_) => "not_native_bidder",
        }
    }
}
