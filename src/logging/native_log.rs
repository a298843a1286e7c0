// src/logging/native_log.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::bid::Bid;
use crate::native::error::NativeError;

/// **native 处理日志**：每个出价的一次校验 / targeting / 消息处理
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NativeLog {
    pub timestamp: String,        // 记录时间
    pub log_type: String,         // 日志类型，如 "native_targeting"
    pub ad_unit_code: String,     // 广告位 code
    pub ad_id: String,            // 出价的 adId
    pub bidder: String,           // 出价方
    pub status: String,           // "success" or "failure"
    pub error_kind: Option<String>, // 失败时的错误种类
    pub reason: Option<String>,   // 失败原因
    pub targeting_keys: usize,    // 输出的 targeting key 数量
}

impl NativeLog {
    /// **创建日志**，默认成功，后续可更新
    pub fn new(log_type: &str, bid: &Bid) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            log_type: log_type.to_string(),
            ad_unit_code: bid.ad_unit_code.clone(),
            ad_id: bid.ad_id.clone(),
            bidder: bid.bidder.clone(),
            status: "success".to_string(),
            error_kind: None,
            reason: None,
            targeting_keys: 0,
        }
    }

    /// **记录失败**
    pub fn set_failure(&mut self, err: &NativeError) {
        self.status = "failure".to_string();
        self.error_kind = Some(err.kind().to_string());
        self.reason = Some(err.to_string());
    }

    pub fn set_targeting_keys(&mut self, count: usize) {
        self.targeting_keys = count;
    }

    /// 以 JSON 形式写入 tracing
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(line) => info!(native_log = %line, "{}", self.log_type),
            Err(e) => info!("Failed to serialize native log: {}", e),
        }
    }
}
