//! API endpoint implementations.

mod authentication;
mod files;
mod messages;
mod permissions;
mod preferences;
mod sessions;
mod streaming;
mod system;
mod tools;

pub use authentication::AuthenticationApi;
pub use files::FilesApi;
pub use messages::MessagesApi;
pub use permissions::PermissionsApi;
pub use preferences::PreferencesApi;
pub use sessions::SessionsApi;
pub use streaming::{StreamOptions, StreamingApi};
pub use system::SystemApi;
pub use tools::ToolsApi;
