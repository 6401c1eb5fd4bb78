//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian
//! length. Mode is derived from signals by the arbiter and is therefore
//! read-only over IPC; there is deliberately no request to set it.

use serde::{Deserialize, Serialize};

use crate::arbiter::Mode;

/// Requests from control clients to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request current daemon status
    GetStatus,

    /// Ping to check connectivity
    Ping,

    /// Subscribe to mode change notifications
    Subscribe,
}

/// Responses from daemon to control clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current daemon status
    Status(DaemonStatus),

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

/// Push notification to subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// The committed mode changed
    ModeChanged {
        mode: Mode,
        previous: Mode,
        label: String,
    },
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Currently committed mode
    pub mode: Mode,

    /// Sanitized signal flags
    pub source_connected: bool,
    pub music_active: bool,
    pub call_active: bool,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: Mode::default(),
            source_connected: false,
            music_active: false,
            call_active: false,
            uptime_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::GetStatus;
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("get_status"));
    }

    #[test]
    fn test_response_serialization() {
        let resp = Response::Status(DaemonStatus::default());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("status"));
        assert!(json.contains("idle"));
    }

    #[test]
    fn test_notification_carries_label() {
        let note = Notification::ModeChanged {
            mode: Mode::Call,
            previous: Mode::Music,
            label: "MUSIC->CALL".to_string(),
        };
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("mode_changed"));
        assert!(json.contains("MUSIC->CALL"));
    }

    #[test]
    fn test_request_deserialization() {
        let json = r#"{"type":"subscribe"}"#;
        let req: Request = serde_json::from_str(json).unwrap();
        assert!(matches!(req, Request::Subscribe));
    }
}
