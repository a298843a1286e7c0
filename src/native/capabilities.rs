// src/native/capabilities.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::ad_unit::AdUnit;

/// 支持 native 的出价方集合，由宿主在启动时给出
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NativeBidders(BTreeSet<String>);

impl NativeBidders {
    pub fn new<I, S>(bidders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(bidders.into_iter().map(Into::into).collect())
    }

    /// 逗号分隔的出价方列表，例如 `appnexus,rubicon`
    pub fn from_csv(bidders: &str) -> Self {
        Self::new(
            bidders
                .split(',')
                .map(str::trim)
                .filter(|bidder| !bidder.is_empty()),
        )
    }

    pub fn is_native_bidder(&self, bidder: &str) -> bool {
        self.0.contains(bidder)
    }

    /// 广告位上不支持 native 的出价方
    pub fn non_native_bidders<'a>(&self, ad_unit: &'a AdUnit) -> Vec<&'a str> {
        ad_unit
            .bids
            .iter()
            .filter(|bid| !self.is_native_bidder(&bid.bidder))
            .map(|bid| bid.bidder.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 广告位是否请求 native
pub fn is_native_ad_unit(ad_unit: &AdUnit) -> bool {
    ad_unit.raw_native_params().is_some()
}
