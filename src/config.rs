//! Configuration loading and management

use std::path::PathBuf;

use anyhow::Result;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the unix socket for control clients
    pub control_socket_path: PathBuf,

    /// Path to the unix socket the sensor bridge writes signal events to
    pub signal_socket_path: PathBuf,

    /// Directory for runtime data
    pub runtime_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment and defaults
    ///
    /// Runtime dir resolution: `INTERCOM_RUNTIME_DIR`, then
    /// `$XDG_RUNTIME_DIR/intercom`, then `$HOME/.local/share/intercom`.
    pub fn load() -> Result<Self> {
        let runtime_dir = if let Ok(dir) = std::env::var("INTERCOM_RUNTIME_DIR") {
            PathBuf::from(dir)
        } else if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
            PathBuf::from(dir).join("intercom")
        } else {
            let home = std::env::var("HOME")?;
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("intercom")
        };

        Ok(Self {
            control_socket_path: runtime_dir.join("control.sock"),
            signal_socket_path: runtime_dir.join("signals.sock"),
            runtime_dir,
        })
    }

    /// Ensure the runtime directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.runtime_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load() {
        let config = Config::load().unwrap();
        assert!(config
            .control_socket_path
            .to_string_lossy()
            .contains("intercom"));
        assert!(config.signal_socket_path.ends_with("signals.sock"));
        assert_ne!(config.control_socket_path, config.signal_socket_path);
    }
}
