// src/config/config_manager.rs

use std::collections::HashMap;
use tracing::{info, warn};

use crate::model::ad_unit::{AdUnit, AdUnitIndex};
use crate::model::adapters::ConfigAdapter;
use crate::model::bid::Bid;
use crate::native::capabilities::{is_native_ad_unit, NativeBidders};

/// 广告位配置与 native 出价方集合。
///
/// 启动时加载一次，之后只读，通过 `Arc` 在请求间共享。
#[derive(Debug, Default)]
pub struct ConfigManager {
    ad_units: HashMap<String, AdUnit>,
    /// `None` 表示不限制出价方
    native_bidders: Option<NativeBidders>,
}

impl ConfigManager {
    pub fn new(native_bidders: Option<NativeBidders>) -> Self {
        ConfigManager {
            ad_units: HashMap::new(),
            native_bidders,
        }
    }

    /// 命令行中的逗号分隔列表；空串表示不限制
    pub fn from_args(native_bidders: &str) -> Self {
        let bidders = NativeBidders::from_csv(native_bidders);
        ConfigManager::new(Some(bidders).filter(|b| !b.is_empty()))
    }

    pub fn load(mut self, adapter: &dyn ConfigAdapter) -> Self {
        self.update_ad_units(adapter.get_ad_units());
        self
    }

    /// 替换广告位并立即解析 native 配置，配置问题在加载时就输出诊断
    pub fn update_ad_units(&mut self, ad_units: Vec<AdUnit>) {
        self.ad_units.clear();
        for ad_unit in ad_units {
            if is_native_ad_unit(&ad_unit) {
                self.decorate(&ad_unit);
            }
            self.ad_units.insert(ad_unit.code.clone(), ad_unit);
        }
        info!(ad_units = self.ad_units.len(), "ad unit config loaded");
    }

    fn decorate(&self, ad_unit: &AdUnit) {
        if ad_unit.native_params().is_none() {
            warn!(ad_unit = %ad_unit.code, "native config discarded, ad unit treated as non-native");
        }
        if let Some(bidders) = &self.native_bidders {
            let skipped = bidders.non_native_bidders(ad_unit);
            if !skipped.is_empty() {
                warn!(ad_unit = %ad_unit.code, bidders = ?skipped, "bidders without native support are skipped");
            }
        }
    }

    pub fn ad_unit(&self, code: &str) -> Option<&AdUnit> {
        self.ad_units.get(code)
    }

    pub fn ad_units(&self) -> impl Iterator<Item = &AdUnit> {
        self.ad_units.values()
    }

    pub fn native_bidders(&self) -> Option<&NativeBidders> {
        self.native_bidders.as_ref()
    }

    /// 出价方是否可以在该广告位上返回 native
    pub fn accepts_native_from(&self, ad_unit: &AdUnit, bidder: &str) -> bool {
        match &self.native_bidders {
            Some(bidders) if is_native_ad_unit(ad_unit) => bidders.is_native_bidder(bidder),
            _ => true,
        }
    }
}

impl AdUnitIndex for ConfigManager {
    fn get_ad_unit(&self, bid: &Bid) -> Option<&AdUnit> {
        self.ad_unit(&bid.ad_unit_code)
    }
}
