//! DevTools protocol wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command sent over the page's DevTools socket.
#[derive(Debug, Serialize)]
pub struct DevToolsRequest {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Message received from the DevTools socket.
///
/// With an `id` it answers a command; with a `method` it is an
/// unsolicited event.
#[derive(Debug, Deserialize)]
pub struct DevToolsMessage {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<DevToolsError>,
    pub method: Option<String>,
}

/// Protocol-level error inside a response.
#[derive(Debug, Deserialize)]
pub struct DevToolsError {
    pub code: i64,
    pub message: String,
}

/// Target entry from the `/json/list` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTarget {
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: String,
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

/// Browser info from `/json/version`.
///
/// Chrome returns PascalCase field names for this endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}
