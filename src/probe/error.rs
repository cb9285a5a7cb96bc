//! Probe error types.

use thiserror::Error;

/// Errors raised while driving the headless browser.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No usable Chrome/Chromium binary on this machine.
    #[error("No Chrome or Chromium binary found. Install Google Chrome or Chromium.")]
    ChromeNotFound,

    /// Browser process could not be spawned or never became ready.
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// DevTools endpoint is not answering.
    #[error("DevTools endpoint not available at {0}")]
    DevToolsUnavailable(String),

    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// DevTools protocol-level error response.
    #[error("DevTools error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error during endpoint discovery.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Navigation to the monitored page failed.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The detection script threw in the page.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// A DevTools call did not complete in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The session's socket is gone.
    #[error("DevTools session closed")]
    SessionClosed,

    /// Response shape not what the protocol promises.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for ProbeError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        ProbeError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        ProbeError::Http(e.to_string())
    }
}
