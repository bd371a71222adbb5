//! REST client for the Frappe API.
//!
//! [`FrappeApi`] is the seam between tool logic and the network: the
//! production [`HttpFrappeClient`] speaks HTTP through `reqwest`, tests plug
//! in a scripted fake.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url, header};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use super::error::{ErrorDetail, FrappeError};
use crate::core::config::{CredentialsConfig, FrappeConfig};

/// HTTP verb of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// How a request authenticates against Frappe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `Authorization: token key:secret` header.
    Token,
    /// Session cookie obtained by a password login.
    Session,
}

/// A backend call, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path segments, unescaped (`["api", "resource", "Sales Invoice"]`).
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    /// `/api/resource/{doctype}`
    pub fn resource(method: Method, doctype: &str) -> Self {
        Self::new(method, ["api", "resource", doctype])
    }

    /// `/api/resource/{doctype}/{name}`
    pub fn document(method: Method, doctype: &str, name: &str) -> Self {
        Self::new(method, ["api", "resource", doctype, name])
    }

    /// `/api/method/{method}`
    pub fn method(method: Method, dotted_path: &str) -> Self {
        Self::new(method, ["api", "method", dotted_path])
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a query parameter holding JSON (Frappe expects `fields` and
    /// `filters` JSON-encoded).
    pub fn with_json_query(self, key: impl Into<String>, value: &Value) -> Self {
        self.with_query(key, value.to_string())
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Slash-joined path, for logging and assertions.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Value of the first query parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Capability to reach a Frappe site.
#[async_trait]
pub trait FrappeApi: Send + Sync {
    /// Send a request and return the decoded JSON body.
    async fn request(&self, request: ApiRequest, auth: AuthMode) -> Result<Value, FrappeError>;

    /// Password login; on success later `AuthMode::Session` calls are
    /// authenticated.
    async fn login(&self, username: &str, password: &str) -> Result<(), FrappeError>;
}

/// `reqwest`-backed [`FrappeApi`].
pub struct HttpFrappeClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for HttpFrappeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFrappeClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpFrappeClient {
    pub fn new(config: &FrappeConfig, credentials: &CredentialsConfig) -> Result<Self, FrappeError> {
        let base_url = Url::parse(&config.url).map_err(|e| {
            FrappeError::invalid_input(format!("Invalid Frappe URL '{}': {}", config.url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FrappeError::invalid_input(format!(
                "Invalid Frappe URL '{}': not a base URL",
                config.url
            )));
        }

        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("frappe-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: credentials
                .token_pair()
                .map(|(key, secret)| format!("token {}:{}", key, secret)),
        })
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, FrappeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FrappeError::invalid_input("Frappe URL cannot be a base"))?
            .pop_if_empty()
            .extend(&request.segments);

        if !request.query.is_empty() {
            let query = serde_urlencoded::to_string(&request.query)
                .map_err(|e| FrappeError::invalid_input(format!("Invalid query: {}", e)))?;
            url.set_query(Some(&query));
        }
        Ok(url)
    }
}

#[async_trait]
impl FrappeApi for HttpFrappeClient {
    #[instrument(skip_all, fields(method = ?request.method, path = %request.path()))]
    async fn request(&self, request: ApiRequest, auth: AuthMode) -> Result<Value, FrappeError> {
        let url = self.url_for(&request)?;
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        }
        .header(header::ACCEPT, "application/json");

        if auth == AuthMode::Token {
            let token = self.token.as_deref().ok_or_else(|| {
                FrappeError::Authentication("no API token configured".to_string())
            })?;
            builder = builder.header(header::AUTHORIZATION, token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("Frappe responded with HTTP {}", status.as_u16());

        if !status.is_success() {
            let detail = ErrorDetail::from_body(&text);
            warn!("Frappe request failed: HTTP {}{}", status.as_u16(), detail);
            return Err(FrappeError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| FrappeError::decode(e.to_string()))
    }

    #[instrument(skip_all)]
    async fn login(&self, username: &str, password: &str) -> Result<(), FrappeError> {
        let request = ApiRequest::method(Method::Post, "login")
            .with_body(json!({ "usr": username, "pwd": password }));
        let url = self.url_for(&request)?;

        let response = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(&request.body)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = ErrorDetail::from_body(&response.text().await.unwrap_or_default());
        Err(FrappeError::Authentication(format!(
            "login rejected with HTTP {}{}",
            status.as_u16(),
            detail
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> HttpFrappeClient {
        let config = FrappeConfig {
            url: url.to_string(),
            timeout_secs: 5,
        };
        HttpFrappeClient::new(&config, &CredentialsConfig::default()).unwrap()
    }

    #[test]
    fn test_url_escapes_segments() {
        let client = client("https://erp.example.com");
        let request = ApiRequest::document(Method::Get, "Sales Invoice", "SINV/0001");
        let url = client.url_for(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://erp.example.com/api/resource/Sales%20Invoice/SINV%2F0001"
        );
    }

    #[test]
    fn test_url_keeps_base_path_and_query() {
        let client = client("https://example.com/erp/");
        let request = ApiRequest::resource(Method::Get, "ToDo")
            .with_json_query("filters", &json!([["status", "=", "Open"]]))
            .with_query("limit_page_length", "5");
        let url = client.url_for(&request).unwrap();
        assert!(url.as_str().starts_with("https://example.com/erp/api/resource/ToDo?"));
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0].1, r#"[["status","=","Open"]]"#);
        assert_eq!(pairs[1], ("limit_page_length".to_string(), "5".to_string()));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = FrappeConfig {
            url: "not a url".to_string(),
            timeout_secs: 5,
        };
        tokio_test::assert_err!(HttpFrappeClient::new(&config, &CredentialsConfig::default()));
    }

    #[test]
    fn test_request_builder_helpers() {
        let request = ApiRequest::method(Method::Post, "frappe.client.get_count")
            .with_query("doctype", "ToDo");
        assert_eq!(request.path(), "/api/method/frappe.client.get_count");
        assert_eq!(request.query_value("doctype"), Some("ToDo"));
        assert_eq!(request.query_value("missing"), None);
    }

    #[tokio::test]
    async fn test_token_mode_without_token_fails_before_network() {
        // Port 9 (discard) is never contacted: the token check comes first.
        let client = client("http://127.0.0.1:9");
        let err = client
            .request(ApiRequest::resource(Method::Get, "ToDo"), AuthMode::Token)
            .await
            .unwrap_err();
        assert!(matches!(err, FrappeError::Authentication(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = FrappeConfig {
            url: "https://erp.example.com".to_string(),
            timeout_secs: 5,
        };
        let credentials = CredentialsConfig {
            api_key: Some("key_123".to_string()),
            api_secret: Some("secret_456".to_string()),
            ..Default::default()
        };
        let client = HttpFrappeClient::new(&config, &credentials).unwrap();
        let debug_str = format!("{:?}", client);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("secret_456"));
    }
}
