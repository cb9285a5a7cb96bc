//! Headless-browser stream detection.
//!
//! Drives a Chrome instance over the DevTools protocol: one launch and
//! one page navigation at startup, then one detection-script
//! evaluation per poll tick.

pub mod cdp;
pub mod chrome;
pub mod error;
pub mod protocol;
pub mod video;

pub use cdp::DevToolsSession;
pub use chrome::{find_chrome, ChromeConfig, ChromeProcess};
pub use error::ProbeError;
pub use video::VideoStreamProbe;

use async_trait::async_trait;

/// One-shot boolean probe of the monitored page.
#[async_trait]
pub trait StreamProbe: Send + Sync {
    /// Whether the page currently appears to be streaming.
    ///
    /// An error means "could not determine this tick", not "not
    /// streaming"; the caller decides how to fold it.
    async fn probe(&self) -> Result<bool, ProbeError>;

    /// Release any resources held by the probe.
    async fn close(&mut self);
}
