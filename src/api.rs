//! Thin HTTP wrapper shared by the auth, task and chat clients.
//!
//! Every request gets the base URL and a JSON content type; authorized ones
//! also carry `Authorization: Bearer <token>`. Non-success statuses become
//! [`Error::Http`] with the server's `detail` text or the caller's fallback.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("taskflow/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("reqwest client should build");
        Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client with default settings against `base_url`. Handy in tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(&Config {
            api_url: base_url.into(),
            ..Config::default()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Unauthenticated request (sign-up, sign-in, password reset).
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
    }

    pub fn authorized(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        self.request(method, path).bearer_auth(session.token())
    }

    /// Sends the request and decodes a JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, fallback: &str) -> Result<T> {
        let response = self.send(request, fallback).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "response body did not decode");
            Error::Decode(e.to_string())
        })
    }

    /// Sends the request and discards the body (e.g. `204 No Content`).
    pub async fn send_empty(&self, request: RequestBuilder, fallback: &str) -> Result<()> {
        self.send(request, fallback).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Response> {
        let request = request.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, "sending request");

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "request failed");
            Error::from(e)
        })?;
        tracing::debug!(%method, %path, status = response.status().as_u16(), "response received");
        check_response(response, fallback).await
    }
}

/// Passes success responses through; turns anything else into [`Error::Http`].
pub async fn check_response(response: Response, fallback: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = extract_detail(&body).unwrap_or_else(|| fallback.to_string());
    tracing::warn!(status = status.as_u16(), %message, "API returned an error");
    Err(Error::Http {
        status: status.as_u16(),
        message,
    })
}

/// Pulls the human-readable `detail` out of an error body.
///
/// `detail` is either a string or, for request validation failures, a list of
/// objects carrying a `msg` each.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_is_used() {
        assert_eq!(
            extract_detail(r#"{"detail":"Incorrect email or password"}"#).as_deref(),
            Some("Incorrect email or password")
        );
    }

    #[test]
    fn validation_detail_messages_are_joined() {
        let body = r#"{"detail":[{"loc":["body","password"],"msg":"too short"},{"msg":"bad email"}]}"#;
        assert_eq!(extract_detail(body).as_deref(), Some("too short; bad email"));
    }

    #[test]
    fn missing_or_unusable_detail_yields_none() {
        assert_eq!(extract_detail("<html>502</html>"), None);
        assert_eq!(extract_detail(r#"{"error":"x"}"#), None);
        assert_eq!(extract_detail(r#"{"detail":""}"#), None);
        assert_eq!(extract_detail(r#"{"detail":[]}"#), None);
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let client = ApiClient::with_base_url("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/api/u/tasks"), "http://localhost:8000/api/u/tasks");
        assert_eq!(client.url("auth/signin"), "http://localhost:8000/auth/signin");
    }

    #[tokio::test]
    async fn non_success_uses_fallback_without_detail() {
        let response = Response::from(
            ::http::Response::builder().status(500).body("oops").unwrap(),
        );
        let err = check_response(response, "Failed to fetch tasks").await.unwrap_err();
        assert!(matches!(err, Error::Http { status: 500, ref message } if message == "Failed to fetch tasks"));
    }
}
