//! Authenticated access to Frappe.
//!
//! [`FrappeBackend`] pairs the REST client with the [`AuthCoordinator`] so
//! every operation goes through the same credential checks. Document and
//! schema operations are implemented as `impl FrappeBackend` blocks in
//! `documents.rs` and `schema.rs`.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::auth::AuthCoordinator;
use super::client::{ApiRequest, FrappeApi};
use super::error::FrappeError;

#[derive(Clone)]
pub struct FrappeBackend {
    api: Arc<dyn FrappeApi>,
    auth: Arc<AuthCoordinator>,
}

impl FrappeBackend {
    pub fn new(api: Arc<dyn FrappeApi>, auth: Arc<AuthCoordinator>) -> Self {
        Self { api, auth }
    }

    pub fn auth(&self) -> &Arc<AuthCoordinator> {
        &self.auth
    }

    /// Authenticate (if needed) and send.
    pub async fn send(&self, request: ApiRequest) -> Result<Value, FrappeError> {
        let mode = self.auth.ensure_ready().await?;
        debug!(path = %request.path(), ?mode, "Sending Frappe request");
        self.api.request(request, mode).await
    }
}

/// Take `key` out of a response envelope.
pub(crate) fn take_field(mut body: Value, key: &str) -> Result<Value, FrappeError> {
    body.get_mut(key)
        .map(Value::take)
        .ok_or_else(|| FrappeError::decode(format!("response has no '{}' field", key)))
}


#[cfg(test)]
mod tests {
    use super::test_support::backend;
    use super::*;
    use crate::core::config::CredentialsConfig;
    use crate::domains::frappe::client::{AuthMode, Method};
    use crate::domains::frappe::testing::{FakeFrappe, login_credentials};
    use serde_json::json;

    #[tokio::test]
    async fn test_send_without_credentials_never_calls_api() {
        let fake = Arc::new(FakeFrappe::new());
        let backend = backend(&fake, CredentialsConfig::default());

        let err = backend
            .send(ApiRequest::resource(Method::Get, "ToDo"))
            .await
            .unwrap_err();

        assert!(matches!(err, FrappeError::Credentials(_)));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_send_uses_session_for_password_login() {
        let fake = Arc::new(FakeFrappe::new());
        let backend = backend(&fake, login_credentials());

        backend
            .send(ApiRequest::resource(Method::Get, "ToDo"))
            .await
            .unwrap();
        backend
            .send(ApiRequest::resource(Method::Get, "ToDo"))
            .await
            .unwrap();

        assert_eq!(fake.login_count(), 1);
        let requests = fake.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|(_, mode)| *mode == AuthMode::Session));
    }

    #[test]
    fn test_take_field() {
        assert_eq!(
            take_field(json!({"data": {"name": "X"}}), "data").unwrap(),
            json!({"name": "X"})
        );
        assert!(matches!(
            take_field(json!({"message": 1}), "data"),
            Err(FrappeError::Decode(_))
        ));
    }
}
