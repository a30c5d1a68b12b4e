use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use super::request::{ApiRequest, Method};
use super::response::ApiResponse;
use crate::error::{GatewayError, Result};

/// Runs one HTTP exchange.
///
/// Any status the server answers with is an `Ok`; only failures to get an
/// answer at all (connection, DNS, timeout) are errors.
pub trait Transport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: &'a ApiRequest,
        access_token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ApiResponse>>;
}

/// `reqwest` backed transport.
///
/// The client keeps a cookie jar so the HTTP-only refresh cookie set at
/// login rides along on the refresh call. The jar is never inspected.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs must stay on the base URL's origin so the session token
    /// is never sent to another host.
    fn url_for(&self, path: &str) -> Result<String> {
        if path.starts_with("http://") || path.starts_with("https://") {
            let same_origin = path
                .strip_prefix(self.base_url.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']));
            if same_origin {
                Ok(path.to_string())
            } else {
                Err(GatewayError::InvalidUrl(path.to_string()))
            }
        } else if path.starts_with('/') {
            Ok(format!("{}{}", self.base_url, path))
        } else {
            Ok(format!("{}/{}", self.base_url, path))
        }
    }

    fn build(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<reqwest::RequestBuilder> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| GatewayError::InvalidHeader(format!("{}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| GatewayError::InvalidHeader(format!("{}: {}", name, e)))?;
            headers.insert(name, value);
        }
        // The API expects the raw token, without a "Bearer" prefix
        if let Some(token) = access_token {
            let value = HeaderValue::from_str(token)
                .map_err(|e| GatewayError::InvalidHeader(format!("authorization: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self
            .client
            .request(method, self.url_for(&request.path)?)
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        Ok(builder)
    }
}

impl Transport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: &'a ApiRequest,
        access_token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<ApiResponse>> {
        Box::pin(async move {
            let response = self.build(request, access_token)?.send().await?;
            let status = response.status().as_u16();
            let text = response.text().await?;
            debug!(%request, status, "response received");
            Ok(ApiResponse::from_text(status, &text))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let transport = ReqwestTransport::new("http://localhost:5000/").unwrap();
        assert_eq!(
            transport.url_for("/api/v1/designs").unwrap(),
            "http://localhost:5000/api/v1/designs"
        );
        assert_eq!(
            transport.url_for("api/v1/designs").unwrap(),
            "http://localhost:5000/api/v1/designs"
        );
        assert_eq!(
            transport.url_for("http://localhost:5000/api/v1/designs").unwrap(),
            "http://localhost:5000/api/v1/designs"
        );
    }

    #[test]
    fn test_foreign_origin_is_rejected() {
        let transport = ReqwestTransport::new("http://localhost:5000").unwrap();
        for url in [
            "https://cdn.example.com/x",
            "http://localhost:50001/api/v1/designs",
            "https://localhost:5000/api/v1/designs",
            "http://localhost:5000.evil.test/api",
        ] {
            assert!(
                matches!(transport.url_for(url), Err(GatewayError::InvalidUrl(_))),
                "{url}"
            );
        }
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let transport = ReqwestTransport::new("http://localhost:5000").unwrap();
        let request = ApiRequest::get("/api/v1/designs").with_header("bad header", "x");
        let result = transport.build(&request, None);
        assert!(matches!(result, Err(GatewayError::InvalidHeader(_))));
    }
}
