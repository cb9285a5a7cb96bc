//! Stream Monitor - 监控网页直播状态并发送 Discord 通知

pub mod config;
pub mod debounce;
pub mod monitor;
pub mod notification;
pub mod probe;

pub use debounce::{
    StreamDebouncer, StreamEvent, StreamStatus, STREAM_END_THRESHOLD, STREAM_START_THRESHOLD,
};
pub use monitor::{MonitorConfig, StreamMonitor};
pub use notification::{DiscordConfig, DiscordNotifier, Notifier, SendResult};
pub use probe::{ChromeConfig, ProbeError, StreamProbe, VideoStreamProbe};
