//! Well-known filesystem locations.

use std::path::PathBuf;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "MIX_CONFIG_DIR";

const APP_NAME: &str = "mix";

/// Directory holding `client.yaml` and the `logs/` folder.
///
/// `MIX_CONFIG_DIR` wins when set and non-empty.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Directory for rotated log files.
pub fn log_dir() -> PathBuf {
    xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
