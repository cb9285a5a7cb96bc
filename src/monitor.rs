//! 监控循环 - 轮询探测、去抖、通知

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::debounce::{StreamDebouncer, StreamEvent};
use crate::notification::{Notifier, SendResult};
use crate::probe::StreamProbe;

/// 监控参数
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// 监控的页面 URL
    pub url: String,
    /// 轮询间隔
    pub interval: Duration,
}

/// 单个 URL 的监控循环
///
/// 每个 tick：探测 → 去抖 → （必要时）通知 → 睡眠。探测失败折算为
/// 一次「未在直播」采样；通知失败记录日志后继续。两者都不会中断循环。
pub struct StreamMonitor {
    config: MonitorConfig,
    probe: Box<dyn StreamProbe>,
    notifier: Arc<dyn Notifier>,
    debouncer: StreamDebouncer,
    stream_started_at: Option<DateTime<Utc>>,
}

impl StreamMonitor {
    pub fn new(
        config: MonitorConfig,
        probe: Box<dyn StreamProbe>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            probe,
            notifier,
            debouncer: StreamDebouncer::new(),
            stream_started_at: None,
        }
    }

    /// 使用自定义去抖器（测试用）
    pub fn with_debouncer(mut self, debouncer: StreamDebouncer) -> Self {
        self.debouncer = debouncer;
        self
    }

    /// 运行监控循环，直到 shutdown 信号到达
    ///
    /// 信号在两个 tick 之间（或睡眠中）被观察到；进行中的探测和
    /// 通知调用会先自行完成。退出前释放探测器持有的资源。
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            url = %self.config.url,
            interval_secs = self.config.interval.as_secs(),
            "Monitoring started"
        );

        loop {
            let sample = match self.probe.probe().await {
                Ok(is_streaming) => is_streaming,
                Err(e) => {
                    warn!(error = %e, "Probe failed, treating as not streaming");
                    false
                }
            };

            if let Some(event) = self.debouncer.observe(sample) {
                self.handle_event(event).await;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        self.probe.close().await;
        info!("Monitoring stopped");
    }

    /// 把确认的状态变化变成一条通知
    async fn handle_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Started => {
                self.stream_started_at = Some(Utc::now());
            }
            StreamEvent::Ended => {
                if let Some(started_at) = self.stream_started_at.take() {
                    let minutes = (Utc::now() - started_at).num_minutes();
                    info!(minutes, "Stream session ended");
                }
            }
        }

        let message = event_message(&self.config.url, event);
        info!("{}", message);

        match self.notifier.notify(&message).await {
            Ok(SendResult::Sent) => {
                debug!(channel = %self.notifier.name(), "Notification sent");
            }
            Ok(SendResult::Skipped(reason)) => {
                debug!(channel = %self.notifier.name(), reason = %reason, "Notification skipped");
            }
            Ok(SendResult::Failed(reason)) => {
                warn!(channel = %self.notifier.name(), reason = %reason, "Notification delivery failed");
            }
            Err(e) => {
                warn!(channel = %self.notifier.name(), error = %e, "Notification delivery failed");
            }
        }
    }
}

/// 通知文本
fn event_message(url: &str, event: StreamEvent) -> String {
    let status = match event {
        StreamEvent::Started => "streaming",
        StreamEvent::Ended => "not streaming",
    };
    format!("{} is currently {}", url, status)
}
