//! Unix domain socket server for IPC
//!
//! Serves status queries from control clients (panel UI, diagnostics
//! tooling) and pushes mode-change notifications to subscribed clients.
//! The server only mirrors arbiter state; the mode machine task is the
//! sole writer of the arbiter itself.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::arbiter::{transition_label, Mode, SanitizedSignals};

use super::protocol::{DaemonStatus, Notification, Request, Response};

const MAX_MESSAGE_LEN: usize = 64 * 1024;

/// IPC server handling control client connections
pub struct Server {
    socket_path: PathBuf,
    listener: UnixListener,
    state: Arc<RwLock<ServerState>>,
    notify_tx: broadcast::Sender<Notification>,
    shutdown_tx: broadcast::Sender<()>,
}

/// Shared mirror of daemon state
struct ServerState {
    status: DaemonStatus,
    start_time: std::time::Instant,
}

impl Server {
    /// Bind the control socket and create the server
    pub fn bind(socket_path: &Path) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket from a previous run
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind control socket")?;

        // Owner-only: the control surface reports device state
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (notify_tx, _) = broadcast::channel(64);
        let (shutdown_tx, _) = broadcast::channel(1);

        let state = Arc::new(RwLock::new(ServerState {
            status: DaemonStatus::default(),
            start_time: std::time::Instant::now(),
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener,
            state,
            notify_tx,
            shutdown_tx,
        })
    }

    /// Mirror a committed mode change and notify subscribed clients
    pub async fn set_mode(&self, previous: Mode, mode: Mode) {
        {
            let mut state = self.state.write().await;
            state.status.mode = mode;
        }

        let _ = self.notify_tx.send(Notification::ModeChanged {
            mode,
            previous,
            label: transition_label(previous, mode).to_string(),
        });
    }

    /// Mirror the latest sanitized signal snapshot
    pub async fn set_signals(&self, signals: SanitizedSignals) {
        let mut state = self.state.write().await;
        state.status.source_connected = signals.source_connected();
        state.status.music_active = signals.music_active();
        state.status.call_active = signals.call_active();
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("control client connected");
                    let state = Arc::clone(&self.state);
                    let notify_rx = self.notify_tx.subscribe();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, state, notify_rx) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(
        mut stream: UnixStream,
        state: Arc<RwLock<ServerState>>,
        notify_rx: broadcast::Receiver<Notification>,
    ) -> Result<()> {
        let mut len_buf = [0u8; 4];

        loop {
            // Read message length (4-byte little-endian)
            match stream.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("control client disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > MAX_MESSAGE_LEN {
                warn!(len, "message too large, disconnecting");
                return Ok(());
            }

            let mut msg_buf = vec![0u8; len];
            stream.read_exact(&mut msg_buf).await?;

            let request: Request = match serde_json::from_slice(&msg_buf) {
                Ok(request) => request,
                Err(e) => {
                    let response = Response::Error {
                        code: "bad_request".to_string(),
                        message: e.to_string(),
                    };
                    Self::send_message(&mut stream, &response).await?;
                    continue;
                }
            };

            debug!(?request, "received request");

            match request {
                Request::Ping => {
                    Self::send_message(&mut stream, &Response::Pong).await?;
                }

                Request::GetStatus => {
                    let status = {
                        let mut state = state.write().await;
                        state.status.uptime_secs = state.start_time.elapsed().as_secs();
                        state.status.clone()
                    };
                    Self::send_message(&mut stream, &Response::Status(status)).await?;
                }

                Request::Subscribe => {
                    Self::send_message(&mut stream, &Response::Subscribed).await?;
                    // The connection becomes a notification stream from here on.
                    return Self::forward_notifications(stream, notify_rx).await;
                }
            }
        }
    }

    /// Push mode-change notifications until the client goes away
    async fn forward_notifications(
        mut stream: UnixStream,
        mut notify_rx: broadcast::Receiver<Notification>,
    ) -> Result<()> {
        loop {
            match notify_rx.recv().await {
                Ok(note) => {
                    if Self::send_message(&mut stream, &note).await.is_err() {
                        debug!("subscribed client disconnected");
                        return Ok(());
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "subscribed client lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Ok(());
                }
            }
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<T: serde::Serialize>(stream: &mut UnixStream, msg: &T) -> Result<()> {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        stream.write_all(&msg_len).await?;
        stream.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove control socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}
