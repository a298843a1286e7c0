//! Native 素材协商与 targeting 生成
//!
//! - `schema`：广告位 native 配置的解析与校验（旧版扁平配置 / OpenRTB 素材数组）
//! - `validity`：出价返回素材是否满足广告位要求
//! - `keys` / `targeting`：素材 → targeting 键值对
//! - `message` / `trackers`：渲染端按需取素材、触发 tracker

pub mod capabilities;
pub mod error;
pub mod keys;
pub mod message;
pub mod presets;
pub mod schema;
pub mod targeting;
pub mod trackers;
pub mod validity;
pub mod value;

pub use capabilities::{is_native_ad_unit, NativeBidders};
pub use error::NativeError;
pub use keys::{build_key_map, TargetingKeyMap, NATIVE_KEYS};
pub use message::{
    build_all_assets_message, build_asset_message, handle_native_message, AssetMessage, NativeMessage, NativeReply,
};
pub use schema::{is_open_rtb_bid_request_valid, process_native_ad_unit_params, validate_requested_schema, NativeParams};
pub use targeting::{augment_native_payload, build_targeting, get_native_targeting, NativeTargeting};
pub use trackers::{fire_native_trackers, select_trackers, TrackerEvent, TrackerPlan, TrackerSink};
pub use validity::{is_bid_valid, native_bid_is_valid};
pub use value::AssetValue;
