//! Where a context's bearer token comes from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Authentication for a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuthConfig {
    None,

    /// A bearer token read at startup. The file is tried before the variable.
    #[serde(rename_all = "kebab-case")]
    Bearer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_file: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_env: Option<String>,
    },
}

impl AuthConfig {
    pub fn bearer_env(var: impl Into<String>) -> Self {
        Self::Bearer {
            token_file: None,
            token_env: Some(var.into()),
        }
    }

    pub fn bearer_file(path: impl Into<PathBuf>) -> Self {
        Self::Bearer {
            token_file: Some(path.into()),
            token_env: None,
        }
    }

    /// Read the token. A missing file or unset variable is `None`, not an error;
    /// a file that exists but cannot be read is.
    pub fn resolve(&self) -> Result<Option<String>> {
        let AuthConfig::Bearer {
            token_file,
            token_env,
        } = self
        else {
            return Ok(None);
        };

        if let Some(token) = token_file.as_deref().map(read_token_file).transpose()?.flatten() {
            return Ok(Some(token));
        }
        Ok(token_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }
}

fn read_token_file(path: &Path) -> Result<Option<String>> {
    let path = expand_home(path);
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(Some(contents.trim().to_string()).filter(|t| !t.is_empty())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// `~/x` becomes `$HOME/x`; anything else is returned unchanged.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
