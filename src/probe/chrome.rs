//! Chrome process management: discovery, launch, readiness, shutdown.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info};

use super::error::ProbeError;
use super::protocol::{BrowserVersion, PageTarget};

const READY_ATTEMPTS: u32 = 30;
const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Browser launch settings.
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    /// DevTools debugging port.
    pub debug_port: u16,
    /// Run without a visible window.
    pub headless: bool,
    /// Profile directory; an isolated per-tool default is used when unset.
    pub profile_dir: Option<PathBuf>,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            headless: true,
            profile_dir: None,
        }
    }
}

impl ChromeConfig {
    /// DevTools HTTP endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }

    fn resolved_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".stream-monitor")
                .join("browser-profile")
        })
    }
}

/// Locate a Chrome/Chromium binary on this machine.
pub fn find_chrome() -> Option<PathBuf> {
    let names = [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
        "chrome",
    ];
    for name in names {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    #[cfg(target_os = "macos")]
    {
        let paths = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ];
        for path in &paths {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let paths = [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];
        for path in &paths {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let paths = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];
        for path in &paths {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// A browser reachable on a DevTools port.
///
/// Holds the child process when this monitor launched the browser
/// itself; attaching to an already-running browser leaves `child`
/// empty and shutdown will not touch it.
pub struct ChromeProcess {
    child: Option<Child>,
    endpoint: String,
}

impl ChromeProcess {
    /// Launch Chrome (or attach to one already on the port) and wait
    /// until its DevTools endpoint answers.
    pub async fn start(config: &ChromeConfig) -> Result<Self, ProbeError> {
        let endpoint = config.endpoint();

        if let Ok(version) = Self::fetch_version(&endpoint).await {
            info!(
                "Browser already running on port {}, attaching",
                config.debug_port
            );
            debug!("Browser: {}", version.browser);
            return Ok(Self {
                child: None,
                endpoint,
            });
        }

        let chrome_path = find_chrome().ok_or(ProbeError::ChromeNotFound)?;
        let profile_dir = config.resolved_profile_dir();
        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            return Err(ProbeError::Launch(format!(
                "cannot create profile directory {}: {}",
                profile_dir.display(),
                e
            )));
        }

        info!(
            "Launching {} (headless: {})",
            chrome_path.display(),
            config.headless
        );

        let mut cmd = Command::new(&chrome_path);
        cmd.arg(format!("--remote-debugging-port={}", config.debug_port))
            .arg(format!("--user-data-dir={}", profile_dir.display()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--autoplay-policy=no-user-gesture-required")
            .arg("--mute-audio")
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if config.headless {
            cmd.arg("--headless=new");
        }

        let mut child = cmd.spawn().map_err(|e| ProbeError::Launch(e.to_string()))?;
        debug!("Browser launched with PID: {:?}", child.id());

        let mut attempts = 0;
        loop {
            match Self::fetch_version(&endpoint).await {
                Ok(version) => {
                    debug!("Browser: {}", version.browser);
                    break;
                }
                Err(_) if attempts < READY_ATTEMPTS => {
                    attempts += 1;
                    tokio::time::sleep(READY_POLL_INTERVAL).await;
                }
                Err(_) => {
                    let _ = child.kill().await;
                    return Err(ProbeError::Launch(
                        "browser did not open its DevTools port in time".to_string(),
                    ));
                }
            }
        }

        Ok(Self {
            child: Some(child),
            endpoint,
        })
    }

    async fn fetch_version(endpoint: &str) -> Result<BrowserVersion, ProbeError> {
        let url = format!("{}/json/version", endpoint);
        let version: BrowserVersion = reqwest::get(&url).await?.json().await?;
        Ok(version)
    }

    /// WebSocket debugger URL of a page target, creating a blank page
    /// if the browser has none.
    pub async fn page_ws_url(&self) -> Result<String, ProbeError> {
        let url = format!("{}/json/list", self.endpoint);
        let targets: Vec<PageTarget> = reqwest::get(&url)
            .await
            .map_err(|e| ProbeError::DevToolsUnavailable(format!("{}: {}", self.endpoint, e)))?
            .json()
            .await?;

        for target in targets {
            if target.target_type == "page" {
                if let Some(ws_url) = target.web_socket_debugger_url {
                    debug!("Using page target {} ({})", target.id, target.url);
                    return Ok(ws_url);
                }
            }
        }

        // Chrome requires PUT for /json/new
        let create_url = format!("{}/json/new", self.endpoint);
        let client = reqwest::Client::new();
        let target: PageTarget = client.put(&create_url).send().await?.json().await?;
        debug!("Created page target {}", target.id);

        target
            .web_socket_debugger_url
            .ok_or_else(|| ProbeError::InvalidResponse("page target has no debugger URL".to_string()))
    }

    /// Kill the browser if this monitor launched it.
    pub async fn shutdown(&mut self) {
        if let Some(mut child) = self.child.take() {
            info!("Shutting down browser");
            let _ = child.kill().await;
        }
    }
}
