//! Signal feed: unix-socket intake for sensor-bridge events
//!
//! The sensor bridge (which owns GPIO polling and debouncing) connects to
//! the signal socket and writes one JSON `SignalEvent` per line. The feed
//! forwards every parsed event onto the mpsc channel consumed by the mode
//! machine, so all producers serialize onto the single arbiter writer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::inputs::SignalEvent;

/// Errors that can occur while setting up the signal feed
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to prepare signal socket at {path}: {source}")]
    SocketSetup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to bind signal socket at {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Accepts sensor-bridge connections and forwards their signal events
pub struct SignalFeed {
    socket_path: PathBuf,
    listener: UnixListener,
    signal_tx: mpsc::Sender<SignalEvent>,
}

impl SignalFeed {
    /// Bind the signal socket and create the feed
    pub fn bind(socket_path: &Path, signal_tx: mpsc::Sender<SignalEvent>) -> Result<Self, FeedError> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| FeedError::SocketSetup {
                path: socket_path.to_owned(),
                source,
            })?;
        }

        // Remove stale socket from a previous run
        if socket_path.exists() {
            std::fs::remove_file(socket_path).map_err(|source| FeedError::SocketSetup {
                path: socket_path.to_owned(),
                source,
            })?;
        }

        let listener = UnixListener::bind(socket_path).map_err(|source| FeedError::Bind {
            path: socket_path.to_owned(),
            source,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) =
                std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))
            {
                warn!(?e, "failed to restrict signal socket permissions");
            }
        }

        info!(?socket_path, "signal feed listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener,
            signal_tx,
        })
    }

    /// Run the feed, accepting bridge connections
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("sensor bridge connected");
                    let signal_tx = self.signal_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_bridge(stream, signal_tx).await {
                            warn!(?e, "signal connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "signal socket accept error");
                }
            }
        }
    }

    /// Read newline-delimited JSON events from one bridge connection
    async fn handle_bridge(
        stream: UnixStream,
        signal_tx: mpsc::Sender<SignalEvent>,
    ) -> Result<()> {
        let mut lines = BufReader::new(stream).lines();

        while let Some(line) = lines.next_line().await.context("signal socket read")? {
            if line.trim().is_empty() {
                continue;
            }

            // A malformed line never takes the daemon down; log and move on.
            let event: SignalEvent = match serde_json::from_str(&line) {
                Ok(event) => event,
                Err(e) => {
                    warn!(?e, line, "dropping malformed signal event");
                    continue;
                }
            };

            debug!(?event, "signal event received");
            if signal_tx.send(event).await.is_err() {
                debug!("signal channel closed, dropping connection");
                return Ok(());
            }
        }

        debug!("sensor bridge disconnected");
        Ok(())
    }

    /// Remove the socket file on shutdown
    pub fn shutdown(&self) {
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove signal socket file");
            }
        }
    }
}
