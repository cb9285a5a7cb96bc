//! Discord 通知渠道
//!
//! 通过 Discord Bot REST API 向指定频道发送消息

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::channel::{Notifier, SendResult};

/// Discord REST API 基础地址
const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Discord 渠道配置
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot token（认证用）
    pub bot_token: String,
    /// 目标频道 ID
    pub channel_id: u64,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: 0,
            timeout_secs: 30,
        }
    }
}

/// Discord 通知渠道
#[derive(Debug)]
pub struct DiscordNotifier {
    client: Client,
    config: DiscordConfig,
    dry_run: bool,
}

impl DiscordNotifier {
    /// 创建新的 Discord 渠道
    pub fn new(config: DiscordConfig) -> Result<Self> {
        anyhow::ensure!(!config.bot_token.is_empty(), "bot token is required");
        anyhow::ensure!(config.channel_id != 0, "channel id is required");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config,
            dry_run: false,
        })
    }

    /// 设置 dry-run 模式（只记录日志，不实际发送）
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    async fn notify(&self, text: &str) -> Result<SendResult> {
        if self.dry_run {
            info!("[dry-run] {}", text);
            return Ok(SendResult::Skipped("dry-run".to_string()));
        }

        let url = format!(
            "{}/channels/{}/messages",
            DISCORD_API_BASE, self.config.channel_id
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.config.bot_token))
            .json(&serde_json::json!({ "content": text }))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                debug!(
                    "Discord message delivered to channel {}",
                    self.config.channel_id
                );
                Ok(SendResult::Sent)
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                Ok(SendResult::Failed(format!("HTTP {}: {}", status, body)))
            }
            Err(e) => Ok(SendResult::Failed(format!("request failed: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = DiscordConfig::default();
        assert!(config.bot_token.is_empty());
        assert_eq!(config.channel_id, 0);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_notifier_requires_token() {
        let config = DiscordConfig {
            channel_id: 42,
            ..Default::default()
        };

        let result = DiscordNotifier::new(config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("bot token"));
    }

    #[test]
    fn test_notifier_requires_channel_id() {
        let config = DiscordConfig {
            bot_token: "token".to_string(),
            ..Default::default()
        };

        let result = DiscordNotifier::new(config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("channel id"));
    }

    #[tokio::test]
    async fn test_dry_run_skips_delivery() {
        let config = DiscordConfig {
            bot_token: "token".to_string(),
            channel_id: 42,
            ..Default::default()
        };
        let notifier = DiscordNotifier::new(config).unwrap().with_dry_run(true);

        // dry-run 模式下不触发任何网络请求
        let result = notifier.notify("hello").await.unwrap();
        assert_eq!(result, SendResult::Skipped("dry-run".to_string()));
    }
}
