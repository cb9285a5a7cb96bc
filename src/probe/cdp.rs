//! DevTools WebSocket session against a single page target.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::ProbeError;
use super::protocol::{DevToolsMessage, DevToolsRequest};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Per-command timeout.
const CALL_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on waiting for the page to finish loading.
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

struct PendingCall {
    tx: oneshot::Sender<Result<Value, ProbeError>>,
}

/// Connection to one page target over the DevTools protocol.
///
/// Commands are sent on the page's own debugger socket, so no target
/// attach / session multiplexing is involved: every response carries
/// the id of the command that produced it.
pub struct DevToolsSession {
    ws_tx: Arc<Mutex<WsSink>>,
    request_id: AtomicU64,
    pending: Arc<Mutex<HashMap<u64, PendingCall>>>,
    recv_task: tokio::task::JoinHandle<()>,
}

impl DevToolsSession {
    /// Connect to a page's WebSocket debugger URL.
    pub async fn connect(ws_url: &str) -> Result<Self, ProbeError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|e| ProbeError::WebSocket(format!("connect {}: {}", ws_url, e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: Arc<Mutex<HashMap<u64, PendingCall>>> = Arc::new(Mutex::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending).await;
            })
        };

        debug!("DevTools session connected to {}", ws_url);

        Ok(Self {
            ws_tx: Arc::new(Mutex::new(ws_sink)),
            request_id: AtomicU64::new(1),
            pending,
            recv_task,
        })
    }

    async fn receive_loop(mut ws_source: WsSource, pending: Arc<Mutex<HashMap<u64, PendingCall>>>) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("DevTools recv: {}", text);
                    match serde_json::from_str::<DevToolsMessage>(&text) {
                        Ok(message) => {
                            if let Some(id) = message.id {
                                let call = pending.lock().await.remove(&id);
                                if let Some(call) = call {
                                    let result = match message.error {
                                        Some(err) => Err(ProbeError::Protocol {
                                            code: err.code,
                                            message: err.message,
                                        }),
                                        None => Ok(message.result.unwrap_or(Value::Null)),
                                    };
                                    let _ = call.tx.send(result);
                                }
                            } else if let Some(method) = message.method {
                                trace!("DevTools event: {}", method);
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse DevTools message: {}", e);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("DevTools socket closed");
                    break;
                }
                Err(e) => {
                    error!("DevTools socket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    /// Send a command and wait for its response.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, ProbeError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = DevToolsRequest {
            id,
            method: method.to_string(),
            params,
        };
        let json = serde_json::to_string(&request)?;
        trace!("DevTools send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, PendingCall { tx });

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(json.into())).await {
                self.pending.lock().await.remove(&id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ProbeError::SessionClosed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(ProbeError::Timeout(format!("{} timed out", method)))
            }
        }
    }

    /// Evaluate a JavaScript expression in the page, returning its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, ProbeError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["text"].as_str().unwrap_or("Unknown error");
            return Err(ProbeError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Navigate the page and wait for it to load.
    pub async fn navigate(&self, url: &str) -> Result<(), ProbeError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText") {
            if let Some(text) = error.as_str() {
                if !text.is_empty() {
                    return Err(ProbeError::Navigation(text.to_string()));
                }
            }
        }

        self.wait_for_load().await?;
        debug!("Navigated to {}", url);
        Ok(())
    }

    /// Poll `document.readyState` until the page has loaded.
    async fn wait_for_load(&self) -> Result<(), ProbeError> {
        let start = std::time::Instant::now();

        loop {
            let result = self.evaluate("document.readyState").await?;

            if let Some(state) = result.as_str() {
                if state == "complete" || state == "interactive" {
                    return Ok(());
                }
            }

            if start.elapsed() > LOAD_TIMEOUT {
                return Err(ProbeError::Timeout("Page load timed out".to_string()));
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Close the socket and stop the receive task.
    pub async fn close(&self) {
        {
            let mut ws = self.ws_tx.lock().await;
            let _ = ws.send(Message::Close(None)).await;
        }
        self.recv_task.abort();
    }
}

impl Drop for DevToolsSession {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
