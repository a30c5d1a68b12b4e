mod auth;
mod envelope;
mod session;
mod user;

pub use auth::{AccessTokenData, LoginData, LoginResponse, SignUpData};
pub use envelope::{ApiEnvelope, ApiErrorBody, ErrorDetails, ErrorIssue};
pub use session::Session;
pub use user::{UserRole, UserSummary};
