use crate::error::{GatewayError, Result};
use crate::models::{ApiEnvelope, ApiErrorBody};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Status and decoded body of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Decode a raw body: empty is `Null`, non-JSON text is kept as a string
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        };
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Decode the envelope's `data` field
    pub fn data<T: DeserializeOwned>(&self) -> Result<T> {
        let envelope: ApiEnvelope<T> = serde_json::from_value(self.body.clone())?;
        Ok(envelope.data)
    }

    pub fn message(&self) -> Option<String> {
        if let Ok(error) = serde_json::from_value::<ApiErrorBody>(self.body.clone()) {
            return Some(error.describe());
        }
        match &self.body {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            _ => None,
        }
    }

    pub fn into_error(self) -> GatewayError {
        let message = self
            .message()
            .unwrap_or_else(|| default_reason(self.status).to_string());
        GatewayError::Api {
            status: self.status,
            message,
        }
    }
}

fn default_reason(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not found",
        409 => "Conflict",
        500..=599 => "Server error",
        _ => "Request failed",
    }
}
