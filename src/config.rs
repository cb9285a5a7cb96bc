//! 配置加载 - Discord 凭证按优先级从配置文件和环境变量读取

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::debug;

use crate::notification::DiscordConfig;

/// 配置文件位置（相对 home 目录）
const CONFIG_FILE_PATH: &str = ".config/stream-monitor/config.json";

/// 按优先级加载 Discord 凭证：
/// 1. `~/.config/stream-monitor/config.json`（`bot_token` / `channel_id` 字段）
/// 2. 环境变量 `DISCORD_BOT_TOKEN` / `DISCORD_CHANNEL_ID`
///
/// 两个来源都没有完整凭证时返回错误（监控循环不会启动）。
pub fn load_discord_config() -> Result<DiscordConfig> {
    // 1. 配置文件
    if let Some(home) = dirs::home_dir() {
        let config_path = home.join(CONFIG_FILE_PATH);
        if config_path.exists() {
            if let Some(config) = load_from_file(&config_path) {
                debug!(
                    "Using Discord credentials from {}",
                    config_path.display()
                );
                return Ok(config);
            }
        }
    }

    // 2. 环境变量
    if let (Ok(token), Ok(channel)) = (
        std::env::var("DISCORD_BOT_TOKEN"),
        std::env::var("DISCORD_CHANNEL_ID"),
    ) {
        if !token.is_empty() && !channel.is_empty() {
            let channel_id = parse_channel_id(&channel)?;
            debug!("Using Discord credentials from environment");
            return Ok(DiscordConfig {
                bot_token: token,
                channel_id,
                ..Default::default()
            });
        }
    }

    Err(anyhow!(
        "No Discord credentials found. Create ~/.config/stream-monitor/config.json with \
         bot_token and channel_id, or set DISCORD_BOT_TOKEN and DISCORD_CHANNEL_ID \
         environment variables"
    ))
}

/// 从配置文件读取凭证；字段缺失或解析失败时返回 None（继续尝试下一来源）
fn load_from_file(path: &Path) -> Option<DiscordConfig> {
    let content = fs::read_to_string(path).ok()?;
    let config: serde_json::Value = serde_json::from_str(&content).ok()?;

    let token = config.get("bot_token").and_then(|t| t.as_str())?;
    if token.is_empty() {
        return None;
    }

    // channel_id 允许写成数字或字符串
    let channel_id = match config.get("channel_id")? {
        serde_json::Value::Number(n) => n.as_u64().filter(|id| *id != 0)?,
        serde_json::Value::String(s) => parse_channel_id(s).ok()?,
        _ => return None,
    };

    Some(DiscordConfig {
        bot_token: token.to_string(),
        channel_id,
        ..Default::default()
    })
}

/// 解析频道 ID（Discord snowflake，必须是正整数）
fn parse_channel_id(raw: &str) -> Result<u64> {
    let id: u64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid channel ID '{}': expected a numeric Discord channel ID", raw))?;

    anyhow::ensure!(id != 0, "Channel ID must be a positive integer");
    Ok(id)
}
