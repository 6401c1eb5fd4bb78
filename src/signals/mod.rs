//! Signal intake module
//!
//! Receives pre-debounced signal edges from the sensor-bridge process over
//! a unix socket and forwards them to the mode machine. Debouncing and
//! GPIO access live in the bridge, not here.

mod feed;
mod inputs;

pub use feed::{FeedError, SignalFeed};
pub use inputs::{InputSignals, SignalEvent};
