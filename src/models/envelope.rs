use serde::{Deserialize, Serialize};

/// Standard success envelope returned by every API endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// Error body the API sends alongside non-success statuses.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub status_code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorDetails>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorDetails {
    #[serde(default)]
    pub issues: Vec<ErrorIssue>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorIssue {
    pub field: String,
    pub message: String,
}

impl ApiErrorBody {
    /// Message with validation issues appended, e.g. `Validation failed (email: invalid)`.
    pub fn describe(&self) -> String {
        match &self.error_details {
            Some(details) if !details.issues.is_empty() => {
                let issues: Vec<String> = details
                    .issues
                    .iter()
                    .map(|i| format!("{}: {}", i.field, i.message))
                    .collect();
                format!("{} ({})", self.message, issues.join(", "))
            }
            _ => self.message.clone(),
        }
    }
}
