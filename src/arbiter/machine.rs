//! Stateful mode arbitration
//!
//! `ModeArbiter` is the single owner of the committed mode and the last
//! sanitized signal snapshot. `ModeMachine` wraps it in the daemon's event
//! loop, feeding it signal events and broadcasting committed transitions.

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use crate::events::ModeEvent;
use crate::signals::{InputSignals, SignalEvent};

use super::resolve::{resolve, sanitize, transition_label, Mode, SanitizedSignals};

/// Record of one committed arbitration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
    /// True iff `from != to`
    pub changed: bool,
}

impl Transition {
    /// Log/telemetry tag for this transition
    pub fn label(&self) -> &'static str {
        transition_label(self.from, self.to)
    }
}

/// Tracks the committed mode and the last sanitized inputs across a
/// sequence of signal events.
///
/// Each intercom endpoint owns its own arbiter; there is no global state.
/// Safe to drive one flag at a time: the setters merge onto the stored
/// sanitized snapshot, so the other two flags are never lost.
#[derive(Debug, Clone, Default)]
pub struct ModeArbiter {
    current: Mode,
    inputs: SanitizedSignals,
}

impl ModeArbiter {
    /// Create an arbiter in IDLE with all signals clear
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently committed mode
    pub fn current_mode(&self) -> Mode {
        self.current
    }

    /// The last sanitized signal snapshot (not the raw value last passed in)
    pub fn inputs(&self) -> SanitizedSignals {
        self.inputs
    }

    /// Replace all three signals at once and commit the resolved mode.
    ///
    /// The sanitized snapshot is refreshed even when the mode does not
    /// change, since individual flags may have flipped underneath a
    /// dominating mode (music toggling during a call).
    pub fn apply_inputs(&mut self, next: InputSignals) -> Transition {
        self.inputs = sanitize(next);
        let to = resolve(self.inputs.raw());
        let t = Transition {
            from: self.current,
            to,
            changed: self.current != to,
        };
        self.current = to;
        t
    }

    /// Update only the source-connected flag
    pub fn set_source_connected(&mut self, connected: bool) -> Transition {
        let mut next = self.inputs.raw();
        next.source_connected = connected;
        self.apply_inputs(next)
    }

    /// Update only the music-active flag
    pub fn set_music_active(&mut self, active: bool) -> Transition {
        let mut next = self.inputs.raw();
        next.music_active = active;
        self.apply_inputs(next)
    }

    /// Update only the call-active flag
    pub fn set_call_active(&mut self, active: bool) -> Transition {
        let mut next = self.inputs.raw();
        next.call_active = active;
        self.apply_inputs(next)
    }
}

/// Drives a `ModeArbiter` from the daemon's signal channel
pub struct ModeMachine {
    arbiter: ModeArbiter,
    /// Channel for emitting mode events
    event_tx: broadcast::Sender<ModeEvent>,
}

impl ModeMachine {
    /// Create a new machine around a fresh arbiter
    pub fn new(event_tx: broadcast::Sender<ModeEvent>) -> Self {
        Self {
            arbiter: ModeArbiter::new(),
            event_tx,
        }
    }

    /// The currently committed mode
    pub fn mode(&self) -> Mode {
        self.arbiter.current_mode()
    }

    /// Run the machine, applying signal events until the channel closes
    pub async fn run(&mut self, mut signal_rx: mpsc::Receiver<SignalEvent>) {
        info!(mode = %self.mode(), "mode machine started");

        while let Some(event) = signal_rx.recv().await {
            self.handle_signal(event);
        }

        info!("mode machine stopped");
    }

    /// Apply one signal event and publish the outcome
    fn handle_signal(&mut self, event: SignalEvent) {
        debug!(?event, "signal event");

        let transition = match event {
            SignalEvent::SourceConnected { connected } => {
                self.arbiter.set_source_connected(connected)
            }
            SignalEvent::MusicActive { active } => self.arbiter.set_music_active(active),
            SignalEvent::CallActive { active } => self.arbiter.set_call_active(active),
            SignalEvent::Snapshot {
                source_connected,
                music_active,
                call_active,
            } => self.arbiter.apply_inputs(InputSignals {
                source_connected,
                music_active,
                call_active,
            }),
        };

        let snapshot = self.arbiter.inputs();
        let _ = self.event_tx.send(ModeEvent::SignalsUpdated {
            source_connected: snapshot.source_connected(),
            music_active: snapshot.music_active(),
            call_active: snapshot.call_active(),
        });

        if transition.changed {
            info!(
                from = %transition.from,
                to = %transition.to,
                label = transition.label(),
                "mode transition"
            );
            let _ = self.event_tx.send(ModeEvent::ModeChanged {
                from: transition.from,
                to: transition.to,
            });
        }
    }
}
