pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod ui;

pub use api::{ApiRequest, ApiResponse, RefreshOutcome, ReqwestTransport, SessionGateway, Transport};
pub use auth::AuthClient;
pub use error::{GatewayError, Result};
pub use session::{FilesystemSessionStore, MemorySessionStore, SessionStore};
