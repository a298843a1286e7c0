// src/model/adapters.rs

use crate::model::ad_unit::AdUnit;
use serde_json::Result as JsonResult;
use std::fs;
use tracing::warn;

/// 广告位配置来源
pub trait ConfigAdapter: Send + Sync {
    fn get_ad_units(&self) -> Vec<AdUnit>;
}

/// 从 JSON 文件读取广告位配置
pub struct FileConfigAdapter {
    pub ad_unit_file: String,
}

impl FileConfigAdapter {
    pub fn new(ad_unit_file: &str) -> Self {
        Self {
            ad_unit_file: ad_unit_file.to_string(),
        }
    }
}

impl ConfigAdapter for FileConfigAdapter {
    fn get_ad_units(&self) -> Vec<AdUnit> {
        let content = match fs::read_to_string(&self.ad_unit_file) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %self.ad_unit_file, "Unable to read ad unit config: {}", e);
                return Vec::new();
            }
        };
        let config: JsonResult<Vec<AdUnit>> = serde_json::from_str(&content);
        config.unwrap_or_else(|e| {
            warn!(file = %self.ad_unit_file, "Unable to parse ad unit config: {}", e);
            Vec::new()
        })
    }
}

/// 内存中的配置，测试和嵌入场景使用
pub struct StaticConfigAdapter {
    pub ad_units: Vec<AdUnit>,
}

impl ConfigAdapter for StaticConfigAdapter {
    fn get_ad_units(&self) -> Vec<AdUnit> {
        self.ad_units.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_ad_units_from_file() {
        let path = std::env::temp_dir().join(format!("ad_units_{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"code": "div-1", "mediaTypes": {{"native": {{"type": "image"}}}}, "bids": [{{"bidder": "appnexus"}}]}}]"#
        )
        .unwrap();

        let adapter = FileConfigAdapter::new(path.to_str().unwrap());
        let units = adapter.get_ad_units();
        assert_eq!(units.len(), 1);
        assert!(units[0].native_params().unwrap().is_ortb());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_or_broken_file_yields_no_ad_units() {
        assert!(FileConfigAdapter::new("/nonexistent/ad_units.json").get_ad_units().is_empty());

        let path = std::env::temp_dir().join(format!("broken_ad_units_{}.json", std::process::id()));
        fs::write(&path, "{not json").unwrap();
        assert!(FileConfigAdapter::new(path.to_str().unwrap()).get_ad_units().is_empty());
        fs::remove_file(&path).unwrap();
    }
}
