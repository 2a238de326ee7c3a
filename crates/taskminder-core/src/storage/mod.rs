mod config;

pub use config::{Config, DatesConfig, ListConfig, RemindersConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// Resolution order:
/// - `TASKMINDER_DATA_DIR` if set
/// - `~/.config/taskminder-dev/` when `TASKMINDER_ENV=dev`
/// - `~/.config/taskminder/` otherwise
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TASKMINDER_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TASKMINDER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("taskminder-dev")
            } else {
                base_dir.join("taskminder")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
