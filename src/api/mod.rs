pub mod endpoints;
pub mod gateway;
pub mod request;
pub mod response;
pub mod transport;

pub use endpoints::AuthEndpoint;
pub use gateway::{RefreshOutcome, SessionGateway, DEFAULT_TIMEOUT_SECS};
pub use request::{ApiRequest, Method};
pub use response::ApiResponse;
pub use transport::{ReqwestTransport, Transport};
