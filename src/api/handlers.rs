use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ConfigManager;
use crate::logging::native_log::NativeLog;
use crate::model::ad_unit::{AdUnit, AdUnitIndex};
use crate::model::bid::Bid;
use crate::native::error::NativeError;
use crate::native::message::{handle_native_message, NativeMessage, NativeReply};
use crate::native::schema::NativeParams;
use crate::native::targeting::{augment_native_payload, build_targeting, KeyValues};
use crate::native::validity::check_native_bid;
use crate::AppState;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReply {
    pub ad_id: String,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetingReply {
    pub ad_id: String,
    pub targeting: KeyValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// 渲染端消息连同对应出价一起提交
#[derive(Deserialize, Debug, Clone)]
pub struct MessageRequest {
    pub bid: Bid,
    pub message: NativeMessage,
}

/// 找到广告位、检查出价方能力、校验素材，返回广告位的 native 配置
fn evaluate_bid<'a>(config: &'a ConfigManager, bid: &Bid) -> Result<Option<&'a NativeParams>, NativeError> {
    let ad_unit = config
        .get_ad_unit(bid)
        .ok_or_else(|| NativeError::AdUnitNotFound {
            ad_id: bid.ad_id.clone(),
            ad_unit_code: bid.ad_unit_code.clone(),
        })?;
    if !config.accepts_native_from(ad_unit, &bid.bidder) {
        return Err(NativeError::NotNativeBidder(bid.bidder.clone()));
    }
    let params = ad_unit.native_params();
    check_native_bid(bid, params)?;
    Ok(params)
}

/// **校验 native 出价**
pub async fn handle_validate(
    State(state): State<Arc<AppState>>,
    Json(bid): Json<Bid>,
) -> (StatusCode, Json<ValidationReply>) {
    let mut log = NativeLog::new("native_validate", &bid);
    let reply = match evaluate_bid(&state.config, &bid) {
        Ok(_) => ValidationReply {
            ad_id: bid.ad_id.clone(),
            valid: true,
            reason: None,
        },
        Err(err) => {
            log.set_failure(&err);
            ValidationReply {
                ad_id: bid.ad_id.clone(),
                valid: false,
                reason: Some(err.to_string()),
            }
        }
    };
    log.emit();
    (StatusCode::OK, Json(reply))
}

/// **生成 native targeting**，无效出价不输出任何键值
pub async fn handle_targeting(
    State(state): State<Arc<AppState>>,
    Json(bid): Json<Bid>,
) -> (StatusCode, Json<TargetingReply>) {
    let mut log = NativeLog::new("native_targeting", &bid);
    let result = match evaluate_bid(&state.config, &bid) {
        Ok(params) => {
            let targeting = build_targeting(&bid, params).key_values;
            log.set_targeting_keys(targeting.len());
            (
                StatusCode::OK,
                Json(TargetingReply {
                    ad_id: bid.ad_id.clone(),
                    targeting,
                    reason: None,
                }),
            )
        }
        Err(err) => {
            log.set_failure(&err);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(TargetingReply {
                    ad_id: bid.ad_id.clone(),
                    targeting: KeyValues::new(),
                    reason: Some(err.to_string()),
                }),
            )
        }
    };
    log.emit();
    result
}

/// **处理渲染端消息**：按需取素材或返回 tracker 计划
pub async fn handle_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<NativeReply>, (StatusCode, String)> {
    let MessageRequest { bid, message } = request;
    let mut log = NativeLog::new("native_message", &bid);

    if message.ad_id() != bid.ad_id {
        let reason = format!("message adId {} does not match bid {}", message.ad_id(), bid.ad_id);
        log.status = "failure".to_string();
        log.reason = Some(reason.clone());
        log.emit();
        return Err((StatusCode::BAD_REQUEST, reason));
    }
    let Some(native) = bid.native.as_ref() else {
        log.set_failure(&NativeError::non_conforming(&bid.ad_id, "bid has no native payload"));
        log.emit();
        return Err((StatusCode::BAD_REQUEST, "bid has no native payload".to_string()));
    };

    let params = state.config.get_ad_unit(&bid).and_then(AdUnit::native_params);
    let native = augment_native_payload(native, params);
    let reply = handle_native_message(&message, &native);
    log.emit();
    Ok(Json(reply))
}
