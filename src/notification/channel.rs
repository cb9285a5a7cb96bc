//! 通知渠道 trait 定义

use anyhow::Result;
use async_trait::async_trait;

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（如 dry-run 模式）
    Skipped(String),
    /// 发送失败
    Failed(String),
}

/// 通知渠道 trait
///
/// 渠道只负责投递：消息文本由调用方构建，投递失败不重试。
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 发送一条文本消息（尽力而为）
    async fn notify(&self, text: &str) -> Result<SendResult>;
}
