//! Reading and writing `client.yaml`.

use std::path::{Path, PathBuf};

use crate::client::ClientConfig;
use crate::{ConfigError, Result};

const CLIENT_CONFIG_FILE: &str = "client.yaml";

/// `client.yaml` inside [`crate::xdg_config_dir`].
pub fn client_config_path() -> Option<PathBuf> {
    crate::xdg_config_dir().map(|dir| dir.join(CLIENT_CONFIG_FILE))
}

/// Load `client.yaml` from the config directory. No file means an empty config.
pub fn load_client_config() -> Result<ClientConfig> {
    load_client_config_from(client_config_path().as_deref())
}

pub fn load_client_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        tracing::debug!("No config directory, using defaults");
        return Ok(ClientConfig::new());
    };

    let yaml = match std::fs::read_to_string(path) {
        Ok(yaml) => yaml,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No client config, using defaults");
            return Ok(ClientConfig::new());
        }
        Err(source) => {
            return Err(ConfigError::ReadFile {
                path: path.display().to_string(),
                source,
            });
        }
    };

    let config = ClientConfig::from_yaml(&yaml)?;
    tracing::debug!(
        path = %path.display(),
        contexts = config.contexts.len(),
        "Loaded client config"
    );
    Ok(config)
}

/// Write `client.yaml` into the config directory.
pub fn save_client_config(config: &ClientConfig) -> Result<()> {
    let path = client_config_path().ok_or(ConfigError::NoConfigDir)?;
    save_client_config_to(config, &path)
}

/// Write `config` to `path`, creating parent directories.
pub fn save_client_config_to(config: &ClientConfig, path: &Path) -> Result<()> {
    let write_err = |at: &Path| {
        let path = at.display().to_string();
        move |source| ConfigError::WriteFile { path, source }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err(parent))?;
    }
    std::fs::write(path, config.to_yaml()?).map_err(write_err(path))
}
