use std::fmt;

#[derive(Debug)]
pub enum GatewayError {
    /// The server answered with a non-success status.
    Api {
        status: u16,
        message: String,
    },
    NetworkError(String),
    Timeout,
    NotAuthenticated,
    InvalidHeader(String),
    /// Absolute URL pointing somewhere other than the configured API.
    InvalidUrl(String),
    StorageError(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    Other(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Api { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            GatewayError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            GatewayError::Timeout => write!(f, "Request timeout"),
            GatewayError::NotAuthenticated => write!(f, "Not logged in"),
            GatewayError::InvalidHeader(msg) => write!(f, "Invalid header: {}", msg),
            GatewayError::StorageError(msg) => write!(f, "Session storage error: {}", msg),
            GatewayError::InvalidUrl(url) => write!(f, "URL is outside the configured API: {}", url),
            GatewayError::IoError(e) => write!(f, "IO error: {}", e),
            GatewayError::JsonError(e) => write!(f, "JSON error: {}", e),
            GatewayError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::IoError(e) => Some(e),
            GatewayError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::NetworkError(err.to_string())
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::IoError(err)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::JsonError(err)
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
