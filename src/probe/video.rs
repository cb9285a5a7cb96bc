//! Video playback detection on the monitored page.

use async_trait::async_trait;

use super::cdp::DevToolsSession;
use super::chrome::{ChromeConfig, ChromeProcess};
use super::error::ProbeError;
use super::StreamProbe;

/// Detection expression evaluated once per tick. A page counts as
/// streaming when it has a `<video>` element that is actively playing
/// back data (not paused, not ended, with at least current-frame data).
const DETECT_PLAYBACK_JS: &str = r#"(() => {
    const video = document.querySelector('video');
    if (!video) return false;
    return video.paused === false && !video.ended && video.readyState >= 2;
})()"#;

/// Observes a web page through a headless browser and reports whether
/// a video is currently playing on it.
///
/// The page is navigated once when the probe opens and stays loaded;
/// each probe call evaluates the detection expression in place.
pub struct VideoStreamProbe {
    chrome: ChromeProcess,
    session: DevToolsSession,
}

impl VideoStreamProbe {
    /// Launch the browser and load the monitored page.
    pub async fn open(url: &str, config: ChromeConfig) -> Result<Self, ProbeError> {
        let mut chrome = ChromeProcess::start(&config).await?;

        match Self::attach(&chrome, url).await {
            Ok(session) => Ok(Self { chrome, session }),
            Err(e) => {
                chrome.shutdown().await;
                Err(e)
            }
        }
    }

    async fn attach(chrome: &ChromeProcess, url: &str) -> Result<DevToolsSession, ProbeError> {
        let ws_url = chrome.page_ws_url().await?;
        let session = DevToolsSession::connect(&ws_url).await?;
        session.navigate(url).await?;
        Ok(session)
    }
}

#[async_trait]
impl StreamProbe for VideoStreamProbe {
    async fn probe(&self) -> Result<bool, ProbeError> {
        let value = self.session.evaluate(DETECT_PLAYBACK_JS).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn close(&mut self) {
        self.session.close().await;
        self.chrome.shutdown().await;
    }
}
