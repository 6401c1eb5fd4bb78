//! Raw signal definitions
//!
//! `InputSignals` is the unconstrained, possibly-inconsistent view of the
//! three hardware signals at one instant. `SignalEvent` is the wire shape
//! the sensor bridge uses to report edges, one line of JSON per event.

use serde::{Deserialize, Serialize};

/// The raw signal triple as last reported by the sensor bridge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSignals {
    /// An audio source is physically connected
    pub source_connected: bool,
    /// Music playback is active
    pub music_active: bool,
    /// A call is active
    pub call_active: bool,
}

impl InputSignals {
    /// Check if all signals are clear
    pub fn is_clear(&self) -> bool {
        !self.source_connected && !self.music_active && !self.call_active
    }
}

/// One debounced signal edge (or a full snapshot) from the sensor bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum SignalEvent {
    /// The audio source was plugged in or unplugged
    SourceConnected { connected: bool },
    /// Music playback started or stopped
    MusicActive { active: bool },
    /// A call started or ended
    CallActive { active: bool },
    /// Full replacement of all three signals at once
    Snapshot {
        source_connected: bool,
        music_active: bool,
        call_active: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_clear() {
        let signals = InputSignals::default();
        assert!(signals.is_clear());
    }

    #[test]
    fn test_any_flag_is_not_clear() {
        let signals = InputSignals {
            source_connected: false,
            music_active: true,
            call_active: false,
        };
        assert!(!signals.is_clear());
    }

    #[test]
    fn test_signal_event_serialization() {
        let event = SignalEvent::SourceConnected { connected: true };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("source_connected"));
        assert!(json.contains("true"));
    }

    #[test]
    fn test_signal_event_deserialization() {
        let json = r#"{"signal":"call_active","active":true}"#;
        let event: SignalEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, SignalEvent::CallActive { active: true }));
    }

    #[test]
    fn test_snapshot_deserialization() {
        let json = r#"{"signal":"snapshot","source_connected":true,"music_active":true,"call_active":false}"#;
        let event: SignalEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event,
            SignalEvent::Snapshot {
                source_connected: true,
                music_active: true,
                call_active: false,
            }
        ));
    }
}
