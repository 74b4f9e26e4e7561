//! Client configuration for the Mix tooling.
//!
//! A single YAML file lists named connection contexts (server URL, optional
//! bearer token source, timeout override), which one is current, and the
//! timings shared by all of them. It lives at `$MIX_CONFIG_DIR/client.yaml`,
//! falling back to the platform config directory (`~/.config/mix/client.yaml`
//! on Linux).

pub mod auth;
pub mod client;
pub mod error;
pub mod file;
pub mod paths;

pub use auth::AuthConfig;
pub use client::{ClientConfig, ClientDefaults, Context, DEFAULT_SERVER_URL};
pub use error::{ConfigError, Result};
pub use file::{
    client_config_path, load_client_config, load_client_config_from, save_client_config,
    save_client_config_to,
};
pub use paths::{log_dir, xdg_config_dir, CONFIG_DIR_ENV};
