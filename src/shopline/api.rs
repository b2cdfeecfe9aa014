//! Sends planned requests to the Shopline API.
//!
//! One blocking `reqwest` client per invocation, no retries. The base URL depends on
//! where the credentials came from: a stored profile talks to its store's admin Open
//! API, a direct token talks to the platform Open API. `SHOPLINE_API_BASE_URL` overrides
//! both.

use crate::error::{Result, ShoplineError};
use crate::profiles::Selection;
use crate::schema::{ApiRequest, HttpMethod};
use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT,
};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const API_VERSION: &str = "v20251201";
pub const OPEN_API_BASE_URL: &str = "https://open.shopline.io/v1";

const TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_SNIPPET: usize = 200;

/// Anything that can execute an [`ApiRequest`].
pub trait ApiClient {
    fn send(&self, request: &ApiRequest) -> Result<Value>;
}

/// The admin API base URL for a store handle.
pub fn admin_base_url(handle: &str) -> String {
    format!(
        "https://{}.myshopline.com/admin/openapi/{}",
        handle.trim(),
        API_VERSION
    )
}

/// Base URL and token for a credential selection.
pub fn endpoint(selection: &Selection, base_override: Option<&str>) -> (String, String) {
    let (base, token) = match selection {
        Selection::Profile(profile) => (
            admin_base_url(&profile.credentials.handle),
            profile.credentials.access_token.clone(),
        ),
        Selection::DirectToken(token) => (OPEN_API_BASE_URL.to_string(), token.clone()),
    };
    let base = base_override
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .unwrap_or(base);
    (base.trim_end_matches('/').to_string(), token)
}

pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let invalid = |_: InvalidHeaderValue| {
            ShoplineError::Usage("access token contains invalid characters".into())
        };
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).map_err(invalid)?,
        );
        headers.insert(
            "x-shopline-access-token",
            HeaderValue::from_str(token).map_err(invalid)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("shopline-cli/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(TIMEOUT)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn for_selection(selection: &Selection, base_override: Option<&str>) -> Result<Self> {
        let (base, token) = endpoint(selection, base_override);
        Self::new(&base, &token)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// A short, readable excerpt of an error body; HTML pages are not worth showing.
fn error_snippet(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() || body.starts_with('<') {
        return String::new();
    }
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "errors"] {
            match json.get(key) {
                Some(Value::String(msg)) => return msg.clone(),
                Some(other) if !other.is_null() => return other.to_string(),
                _ => {}
            }
        }
    }
    body.chars().take(MAX_ERROR_SNIPPET).collect()
}

impl ApiClient for HttpClient {
    fn send(&self, request: &ApiRequest) -> Result<Value> {
        let url = self.url(&request.path);
        debug!(method = ?request.method, %url, "sending request");

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let text = response.text()?;
        debug!(status = status.as_u16(), bytes = text.len(), "response received");

        if !status.is_success() {
            let snippet = error_snippet(&text);
            let message = if snippet.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                snippet
            };
            return Err(ShoplineError::Api {
                status: status.as_u16(),
                message,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{MatchKind, ResolvedProfile};
    use crate::store::Credentials;

    fn profile(handle: &str) -> Selection {
        Selection::Profile(ResolvedProfile {
            credentials: Credentials::new("demo", handle, "tok_1"),
            requested: "demo".into(),
            kind: MatchKind::Direct,
        })
    }

    #[test]
    fn test_profile_endpoint() {
        let (base, token) = endpoint(&profile("demo-shop"), None);
        assert_eq!(
            base,
            "https://demo-shop.myshopline.com/admin/openapi/v20251201"
        );
        assert_eq!(token, "tok_1");
    }

    #[test]
    fn test_direct_token_endpoint() {
        let (base, token) = endpoint(&Selection::DirectToken("env_tok".into()), None);
        assert_eq!(base, OPEN_API_BASE_URL);
        assert_eq!(token, "env_tok");
    }

    #[test]
    fn test_base_override() {
        let (base, _) = endpoint(&profile("demo-shop"), Some("http://localhost:8080/"));
        assert_eq!(base, "http://localhost:8080");
        let (base, _) = endpoint(&profile("demo-shop"), Some("  "));
        assert!(base.starts_with("https://demo-shop."));
    }

    #[test]
    fn test_url_join() {
        let client = HttpClient::new("http://localhost:8080/", "t").unwrap();
        assert_eq!(client.url("/orders/1"), "http://localhost:8080/orders/1");
    }

    #[test]
    fn test_invalid_token_rejected() {
        assert!(matches!(
            HttpClient::new("http://localhost", "bad\ntoken"),
            Err(ShoplineError::Usage(_))
        ));
    }

    #[test]
    fn test_error_snippet() {
        assert_eq!(error_snippet(r#"{"message":"Not Found"}"#), "Not Found");
        assert_eq!(error_snippet("<html>oops</html>"), "");
        assert_eq!(error_snippet(&"x".repeat(500)).len(), MAX_ERROR_SNIPPET);
        assert_eq!(error_snippet(r#"{"errors":["a"]}"#), r#"["a"]"#);
    }
}
