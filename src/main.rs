//! intercom-daemon: audio-mode arbiter for a two-party intercom device
//!
//! The daemon owns the single authoritative audio mode (IDLE, MUSIC, CALL)
//! and provides:
//! - Signal intake from the sensor-bridge process over a unix socket
//! - Deterministic mode arbitration (sanitize, resolve, commit)
//! - IPC control surface for status queries and mode notifications
//!
//! The daemon does not touch hardware: GPIO polling, debouncing, and the
//! actual audio-path switching live in the sensor bridge and the routing
//! firmware. This process only turns their debounced signals into one
//! consistent mode decision.

mod arbiter;
mod config;
mod events;
mod ipc;
mod lifecycle;
mod signals;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::arbiter::ModeMachine;
use crate::config::Config;
use crate::events::ModeEvent;
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;
use crate::signals::SignalFeed;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "intercom-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(
        ?config.control_socket_path,
        ?config.signal_socket_path,
        "configuration loaded"
    );

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Create channels for inter-component communication
    // Signal feed -> mode machine
    let (signal_tx, signal_rx) = mpsc::channel(32);
    // Mode machine -> IPC server (for mirroring state and notifying clients)
    let (event_tx, _event_rx) = broadcast::channel::<ModeEvent>(64);

    // Create the mode machine
    let mut machine = ModeMachine::new(event_tx.clone());

    // Bind the signal socket for the sensor bridge
    let feed = SignalFeed::bind(&config.signal_socket_path, signal_tx)?;

    // Bind the control socket for status/notification clients
    let server = Server::bind(&config.control_socket_path)?;

    // Subscribe to mode events for mirroring into the IPC server
    let mut ipc_event_rx = event_tx.subscribe();
    let server_for_events = &server;

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the mode machine (processes signal events)
        _ = machine.run(signal_rx) => {
            info!("mode machine exited");
        }

        // Run the signal feed (accepts sensor-bridge connections)
        result = feed.run() => {
            if let Err(e) = result {
                error!(?e, "signal feed error");
            }
        }

        // Run the IPC server (accepts control clients)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Mirror mode events into the IPC server
        _ = async {
            loop {
                match ipc_event_rx.recv().await {
                    Ok(ModeEvent::ModeChanged { from, to }) => {
                        server_for_events.set_mode(from, to).await;
                    }
                    Ok(ModeEvent::SignalsUpdated {
                        source_connected,
                        music_active,
                        call_active,
                    }) => {
                        server_for_events
                            .set_signals(arbiter::sanitize(signals::InputSignals {
                                source_connected,
                                music_active,
                                call_active,
                            }))
                            .await;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "mode event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("mode event handler exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    feed.shutdown();
    server.shutdown().await;

    info!("intercom-daemon stopped");

    Ok(())
}
