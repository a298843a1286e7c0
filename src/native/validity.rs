// src/native/validity.rs

use tracing::error;

use crate::model::ad_unit::AdUnitIndex;
use crate::model::bid::{Bid, NativePayload};
use crate::native::error::NativeError;
use crate::native::schema::NativeParams;
use crate::openrtb::native_request::NativeRequest;
use crate::openrtb::native_response::NativeResponse;

/// **出价是否满足广告位的 native 要求**
///
/// 找不到广告位即无效；失败原因通过诊断日志输出。
pub fn is_bid_valid(bid: &Bid, index: &dyn AdUnitIndex) -> bool {
    report(check_bid(bid, index))
}

/// 已经拿到广告位配置时使用
pub fn native_bid_is_valid(bid: &Bid, params: Option<&NativeParams>) -> bool {
    report(check_native_bid(bid, params))
}

pub fn check_bid(bid: &Bid, index: &dyn AdUnitIndex) -> Result<(), NativeError> {
    let ad_unit = index
        .get_ad_unit(bid)
        .ok_or_else(|| NativeError::AdUnitNotFound {
            ad_id: bid.ad_id.clone(),
            ad_unit_code: bid.ad_unit_code.clone(),
        })?;
    check_native_bid(bid, ad_unit.native_params())
}

pub fn check_native_bid(bid: &Bid, params: Option<&NativeParams>) -> Result<(), NativeError> {
    let empty = NativePayload::default();
    let native = bid.native.as_ref().unwrap_or(&empty);

    match (native.ortb.as_ref(), params.and_then(|p| p.ortb.as_ref())) {
        (Some(response), Some(request)) => check_ortb_bid(&bid.ad_id, response, request),
        _ => check_legacy_bid(&bid.ad_id, native, params),
    }
}

fn check_ortb_bid(ad_id: &str, response: &NativeResponse, request: &NativeRequest) -> Result<(), NativeError> {
    if response.landing_url().is_none() {
        return Err(NativeError::non_conforming(
            ad_id,
            "native response doesn't have 'link' property",
        ));
    }

    let returned = response.returned_asset_ids();
    let required = request.required_asset_ids();
    let missing: Vec<u64> = required
        .iter()
        .copied()
        .filter(|id| !returned.contains(id))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(NativeError::BidNonConforming {
        ad_id: ad_id.to_string(),
        reason: format!(
            "didn't receive a bid with all required assets. Required ids: {:?}, but received ids in response: {:?}",
            required, returned
        ),
        missing_ids: missing,
    })
}

fn check_legacy_bid(ad_id: &str, native: &NativePayload, params: Option<&NativeParams>) -> Result<(), NativeError> {
    // 所有 native 出价都必须带落地页
    if native.click_url().is_none() {
        return Err(NativeError::non_conforming(ad_id, "native response is missing clickUrl"));
    }

    let Some(params) = params else {
        return Ok(());
    };

    let missing: Vec<&str> = params
        .required_assets()
        .filter(|asset| !native.has_truthy(asset))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(NativeError::non_conforming(
            ad_id,
            format!("missing required assets: {}", missing.join(", ")),
        ))
    }
}

fn report(result: Result<(), NativeError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            error!(kind = err.kind(), "{}", err);
            false
        }
    }
}
