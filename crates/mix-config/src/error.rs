//! Configuration errors.

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write config file '{path}': {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid client config: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    /// A context was named that the file does not define.
    #[error("context '{0}' not found")]
    ContextNotFound(String),

    #[error("no config directory on this platform; set MIX_CONFIG_DIR")]
    NoConfigDir,
}
