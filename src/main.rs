//! Stream Monitor CLI
//!
//! 监控网页直播状态，状态变化时向 Discord 频道发送通知

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use stream_monitor::config::load_discord_config;
use stream_monitor::monitor::{MonitorConfig, StreamMonitor};
use stream_monitor::notification::DiscordNotifier;
use stream_monitor::probe::{ChromeConfig, VideoStreamProbe};

#[derive(Parser)]
#[command(name = "smon")]
#[command(about = "Stream Monitor - 监控网页直播状态并发送 Discord 通知")]
#[command(version)]
struct Cli {
    /// 要监控的页面 URL
    #[arg(long)]
    url: String,

    /// 轮询间隔（秒）
    #[arg(long, default_value_t = 60)]
    interval: u64,

    /// 只记录通知日志，不实际发送
    #[arg(long)]
    dry_run: bool,

    /// Chrome DevTools 调试端口
    #[arg(long, default_value_t = 9222)]
    debug_port: u16,

    /// 以可见窗口运行浏览器（调试用）
    #[arg(long)]
    no_headless: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化 tracing 日志系统
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    // 例如: RUST_LOG=debug smon --url https://example.com/live
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stream_monitor=info,smon=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    // 凭证缺失是致命错误：报告一次，不进入监控循环
    let discord_config = load_discord_config()?;
    let notifier = DiscordNotifier::new(discord_config)?.with_dry_run(cli.dry_run);

    let chrome_config = ChromeConfig {
        debug_port: cli.debug_port,
        headless: !cli.no_headless,
        ..Default::default()
    };
    let probe = VideoStreamProbe::open(&cli.url, chrome_config).await?;

    let config = MonitorConfig {
        url: cli.url,
        interval: Duration::from_secs(cli.interval),
    };
    let mut monitor = StreamMonitor::new(config, Box::new(probe), Arc::new(notifier));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    monitor.run(shutdown_rx).await;
    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
