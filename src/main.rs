// src/main.rs

use axum::serve;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use rust_adx_native::api;
use rust_adx_native::config::ConfigManager;
use rust_adx_native::model::adapters::FileConfigAdapter;
use rust_adx_native::AppState;

#[derive(Parser, Debug)]
#[command(author = "whiteCcinn", version = "1.0", about = "Native asset validation and targeting server")]
struct CliArgs {
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
    #[arg(long, default_value = "logs")]
    log_dir: String,
    /// 广告位配置文件
    #[arg(long, default_value = "static/ad_units.json")]
    ad_units: String,
    /// 支持 native 的出价方，逗号分隔；为空时不限制
    #[arg(long, default_value = "")]
    native_bidders: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化全局 tracing 日志
    let log_file = rolling::hourly(&args.log_dir, "native_log.json");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);
    let subscriber = Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json().with_writer(non_blocking));
    tracing::subscriber::set_global_default(subscriber)?;
    info!("native server starting on port {}", args.port);

    // 加载广告位配置，加载时即完成 native 配置校验
    let adapter = FileConfigAdapter::new(&args.ad_units);
    let config = ConfigManager::from_args(&args.native_bidders).load(&adapter);
    let state = Arc::new(AppState {
        config: Arc::new(config),
    });

    let app = api::router(state);
    let addr = format!("0.0.0.0:{}", args.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("native server running at http://{}", addr);

    serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Unable to listen for shutdown signal: {}", e);
            }
            info!("Shutting down gracefully...");
        })
        .await?;

    info!("native server shut down.");
    Ok(())
}
