//! Events emitted by the mode machine
//!
//! Broadcast to the IPC server (for push notifications) and any telemetry
//! sink. `ModeChanged` is sent only for committed transitions; a
//! `SignalsUpdated` accompanies every applied event so consumers can track
//! flag flips that did not move the mode.

use serde::{Deserialize, Serialize};

use crate::arbiter::{transition_label, Mode};

/// Events emitted by the mode machine as signals are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModeEvent {
    /// The committed mode changed
    ModeChanged { from: Mode, to: Mode },

    /// A signal event was applied; sanitized snapshot after the apply
    SignalsUpdated {
        source_connected: bool,
        music_active: bool,
        call_active: bool,
    },
}

impl std::fmt::Display for ModeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModeEvent::ModeChanged { from, to } => {
                write!(f, "{}", transition_label(*from, *to))
            }
            ModeEvent::SignalsUpdated {
                source_connected,
                music_active,
                call_active,
            } => write!(
                f,
                "SIGNALS source={} music={} call={}",
                source_connected, music_active, call_active
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ModeEvent::ModeChanged {
            from: Mode::Music,
            to: Mode::Call,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("mode_changed"));
        assert!(json.contains("music"));
        assert!(json.contains("call"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"signals_updated","source_connected":true,"music_active":false,"call_active":false}"#;
        let event: ModeEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event,
            ModeEvent::SignalsUpdated {
                source_connected: true,
                ..
            }
        ));
    }

    #[test]
    fn test_mode_changed_displays_label() {
        let event = ModeEvent::ModeChanged {
            from: Mode::Call,
            to: Mode::Music,
        };
        assert_eq!(event.to_string(), "CALL->MUSIC");

        let event = ModeEvent::ModeChanged {
            from: Mode::Idle,
            to: Mode::Idle,
        };
        assert_eq!(event.to_string(), "NO-CHANGE");
    }
}
