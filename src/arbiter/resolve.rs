//! Pure resolution layer: raw signals in, sanitized signals and a mode out
//!
//! Everything here is a total function over small Copy types. No state,
//! no I/O, no allocation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::signals::InputSignals;

/// The device's single authoritative audio-routing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No audio path active
    Idle,
    /// Music playback routed to the speaker
    Music,
    /// Two-party call active; preempts music
    Call,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Idle => write!(f, "IDLE"),
            Mode::Music => write!(f, "MUSIC"),
            Mode::Call => write!(f, "CALL"),
        }
    }
}

/// Signal set known to satisfy the disconnect invariant: if the source is
/// disconnected, music and call are both false.
///
/// Only `sanitize` constructs these; callers read the flags back through
/// the accessors or take a plain copy via `raw`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizedSignals(InputSignals);

impl SanitizedSignals {
    pub fn source_connected(&self) -> bool {
        self.0.source_connected
    }

    pub fn music_active(&self) -> bool {
        self.0.music_active
    }

    pub fn call_active(&self) -> bool {
        self.0.call_active
    }

    /// Copy of the inner triple, for feeding back into `apply_inputs`
    pub fn raw(&self) -> InputSignals {
        self.0
    }
}

/// Normalize a raw signal set: a disconnected source cannot carry music
/// or a call, so both flags are forced false.
pub fn sanitize(raw: InputSignals) -> SanitizedSignals {
    let mut s = raw;
    if !s.source_connected {
        s.music_active = false;
        s.call_active = false;
    }
    SanitizedSignals(s)
}

/// Resolve a raw signal set to a mode. Priority: CALL > MUSIC > IDLE.
///
/// Sanitizes internally, so a disconnected source always resolves to IDLE
/// no matter what the music/call flags claim.
pub fn resolve(raw: InputSignals) -> Mode {
    let inputs = sanitize(raw);
    if inputs.call_active() {
        Mode::Call
    } else if inputs.music_active() {
        Mode::Music
    } else {
        Mode::Idle
    }
}

/// Fixed log/telemetry tag for an ordered mode pair.
pub fn transition_label(from: Mode, to: Mode) -> &'static str {
    match (from, to) {
        (Mode::Idle, Mode::Music) => "IDLE->MUSIC",
        (Mode::Idle, Mode::Call) => "IDLE->CALL",
        (Mode::Music, Mode::Idle) => "MUSIC->IDLE",
        (Mode::Music, Mode::Call) => "MUSIC->CALL",
        (Mode::Call, Mode::Idle) => "CALL->IDLE",
        (Mode::Call, Mode::Music) => "CALL->MUSIC",
        (Mode::Idle, Mode::Idle) | (Mode::Music, Mode::Music) | (Mode::Call, Mode::Call) => {
            "NO-CHANGE"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_raw_combinations() -> Vec<InputSignals> {
        let mut all = Vec::new();
        for bits in 0u8..8 {
            all.push(InputSignals {
                source_connected: bits & 0b100 != 0,
                music_active: bits & 0b010 != 0,
                call_active: bits & 0b001 != 0,
            });
        }
        all
    }

    #[test]
    fn test_sanitize_clears_flags_when_disconnected() {
        for raw in all_raw_combinations() {
            let s = sanitize(raw);
            if !s.source_connected() {
                assert!(!s.music_active());
                assert!(!s.call_active());
            }
        }
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for raw in all_raw_combinations() {
            let once = sanitize(raw);
            let twice = sanitize(once.raw());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_sanitize_preserves_flags_when_connected() {
        let raw = InputSignals {
            source_connected: true,
            music_active: true,
            call_active: true,
        };
        let s = sanitize(raw);
        assert!(s.music_active());
        assert!(s.call_active());
    }

    #[test]
    fn test_call_dominates_music() {
        for music in [false, true] {
            let raw = InputSignals {
                source_connected: true,
                music_active: music,
                call_active: true,
            };
            assert_eq!(resolve(raw), Mode::Call);
        }
    }

    #[test]
    fn test_disconnect_forces_idle() {
        for raw in all_raw_combinations() {
            if !raw.source_connected {
                assert_eq!(resolve(raw), Mode::Idle);
            }
        }
    }

    #[test]
    fn test_resolve_is_deterministic() {
        for raw in all_raw_combinations() {
            assert_eq!(resolve(raw), resolve(raw));
        }
    }

    #[test]
    fn test_resolve_priority_order() {
        let connected = |music, call| InputSignals {
            source_connected: true,
            music_active: music,
            call_active: call,
        };
        assert_eq!(resolve(connected(false, false)), Mode::Idle);
        assert_eq!(resolve(connected(true, false)), Mode::Music);
        assert_eq!(resolve(connected(false, true)), Mode::Call);
        assert_eq!(resolve(connected(true, true)), Mode::Call);
    }

    #[test]
    fn test_transition_labels_cover_all_pairs() {
        let modes = [Mode::Idle, Mode::Music, Mode::Call];
        for from in modes {
            for to in modes {
                let label = transition_label(from, to);
                if from == to {
                    assert_eq!(label, "NO-CHANGE");
                } else {
                    assert_eq!(label, format!("{}->{}", from, to));
                }
            }
        }
    }

    #[test]
    fn test_mode_display_names() {
        assert_eq!(Mode::Idle.to_string(), "IDLE");
        assert_eq!(Mode::Music.to_string(), "MUSIC");
        assert_eq!(Mode::Call.to_string(), "CALL");
    }
}
