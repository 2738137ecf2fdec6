mod config;

pub use config::{Config, DefaultsConfig, MonitorConfig};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `BREAKROOM_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/breakroom[-dev]/`, with the `-dev` suffix when
/// `BREAKROOM_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("BREAKROOM_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BREAKROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("breakroom-dev")
            } else {
                base_dir.join("breakroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
