//! HTTP endpoint hosting the Steam OpenID login redirect and callback.

pub mod config;
pub mod server;

pub use config::ServerConfig;
pub use server::{ApiError, AppState, ProfileSettings, app_router, run_server};
