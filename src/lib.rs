// src/lib.rs

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod logging;
pub mod model;
pub mod native;
pub mod openrtb;

use config::config_manager::ConfigManager;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigManager>,
}
