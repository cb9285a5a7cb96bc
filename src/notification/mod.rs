//! 通知抽象层
//!
//! 渠道实现 `Notifier` trait。投递是尽力而为的：失败只记录日志，
//! 不重试，也不影响监控状态机。

pub mod channel;
pub mod discord;

pub use channel::{Notifier, SendResult};
pub use discord::{DiscordConfig, DiscordNotifier};
