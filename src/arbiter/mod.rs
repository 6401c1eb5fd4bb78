//! Audio-mode arbitration
//!
//! Reduces the three debounced hardware signals (source connected, music
//! active, call active) to one authoritative mode:
//! - Idle: no audio path
//! - Music: playback routed while no call is up
//! - Call: two-party call, preempts music
//!
//! `resolve` holds the pure sanitize/priority logic; `machine` holds the
//! stateful arbiter and its async driver.

mod machine;
mod resolve;

pub use machine::{ModeArbiter, ModeMachine, Transition};
pub use resolve::{resolve, sanitize, transition_label, Mode, SanitizedSignals};
