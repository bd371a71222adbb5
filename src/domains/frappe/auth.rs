//! Authentication coordinator.
//!
//! One [`AuthCoordinator`] exists per process. It owns the password-session
//! state and guarantees that at most one login is in flight: concurrent
//! callers share the pending attempt's future instead of starting their own.
//! A successful login is reused for [`SESSION_TTL`].

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::client::{ApiRequest, AuthMode, FrappeApi, Method};
use super::error::FrappeError;
use crate::core::config::{CredentialsConfig, MissingCredential};

/// How long a password session is trusted before logging in again.
pub const SESSION_TTL: Duration = Duration::from_secs(1800);

type PendingLogin = Shared<BoxFuture<'static, bool>>;

#[derive(Default)]
struct SessionState {
    authenticated: bool,
    last_auth_attempt: Option<Instant>,
    in_flight: Option<PendingLogin>,
}

impl SessionState {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.authenticated
            && self
                .last_auth_attempt
                .is_some_and(|at| at.elapsed() < ttl)
    }
}

/// Outcome of probing every configured authentication channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub healthy: bool,
    pub token_auth: bool,
    /// `None` when no username/password is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_auth: Option<bool>,
    pub message: String,
}

/// Process-wide authentication state and login single-flight.
pub struct AuthCoordinator {
    api: Arc<dyn FrappeApi>,
    credentials: CredentialsConfig,
    ttl: Duration,
    state: Arc<Mutex<SessionState>>,
}

impl AuthCoordinator {
    pub fn new(api: Arc<dyn FrappeApi>, credentials: CredentialsConfig) -> Self {
        Self {
            api,
            credentials,
            ttl: SESSION_TTL,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub fn credentials(&self) -> &CredentialsConfig {
        &self.credentials
    }

    /// Whether a password session is currently live.
    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.is_fresh(self.ttl)
    }

    /// Log in with username/password, reusing a fresh session or joining an
    /// attempt that is already running.
    pub async fn authenticate_with_password(&self) -> bool {
        let pending = {
            let mut state = self.state.lock().await;
            if let Some(pending) = &state.in_flight {
                debug!("Login already in progress, waiting for its outcome");
                pending.clone()
            } else if state.is_fresh(self.ttl) {
                debug!("Reusing cached password session");
                return true;
            } else {
                let attempt = Self::login_attempt(
                    self.api.clone(),
                    self.credentials.clone(),
                    self.state.clone(),
                )
                .boxed()
                .shared();
                state.in_flight = Some(attempt.clone());
                attempt
            }
        };
        pending.await
    }

    /// Runs detached from any single caller: whichever waiter polls the
    /// shared future drives it, and the state is settled before it resolves.
    async fn login_attempt(
        api: Arc<dyn FrappeApi>,
        credentials: CredentialsConfig,
        state: Arc<Mutex<SessionState>>,
    ) -> bool {
        let outcome = match credentials.login_pair() {
            None => {
                warn!("Password login skipped: {}", MissingCredential::Login);
                false
            }
            Some((username, password)) => {
                info!("Logging in to Frappe as {}", username);
                match api.login(username, password).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Password login failed: {}", e);
                        false
                    }
                }
            }
        };

        let mut state = state.lock().await;
        state.authenticated = outcome;
        if outcome {
            state.last_auth_attempt = Some(Instant::now());
        }
        state.in_flight = None;
        outcome
    }

    /// Pick the auth mode for the next backend call.
    ///
    /// The token pair wins when configured; otherwise the password session
    /// is (re)established. With neither, fails without touching the network.
    pub async fn ensure_ready(&self) -> Result<AuthMode, FrappeError> {
        if self.credentials.token_pair().is_some() {
            return Ok(AuthMode::Token);
        }
        if self.credentials.login_pair().is_none() {
            return Err(FrappeError::Credentials(
                self.credentials
                    .missing_token_credential()
                    .unwrap_or(MissingCredential::ApiKeyAndSecret),
            ));
        }
        if self.authenticate_with_password().await {
            Ok(AuthMode::Session)
        } else {
            Err(FrappeError::Authentication(
                "password login was rejected by Frappe".to_string(),
            ))
        }
    }

    /// Probe each authentication channel independently.
    #[instrument(skip(self))]
    pub async fn check_health(&self) -> HealthReport {
        if let Some(missing) = self.credentials.missing_token_credential() {
            warn!("Health check failed: {}", missing);
            return HealthReport {
                healthy: false,
                token_auth: false,
                password_auth: None,
                message: format!("Frappe API health check failed: {}", missing),
            };
        }

        let token_probe = async {
            let probe = ApiRequest::resource(Method::Get, "DocType")
                .with_query("fields", r#"["name"]"#)
                .with_query("limit_page_length", "1");
            self.api.request(probe, AuthMode::Token).await.map(|_| ())
        };
        let password_probe = async {
            match self.credentials.login_pair() {
                Some(_) => Some(self.authenticate_with_password().await),
                None => None,
            }
        };
        let (token_result, password_auth) = futures::join!(token_probe, password_probe);

        let token_status = match &token_result {
            Ok(()) => "Token authentication: OK".to_string(),
            Err(e) => format!("Token authentication: failed ({})", e),
        };
        let password_status = match password_auth {
            Some(true) => "Password authentication: OK",
            Some(false) => "Password authentication: failed",
            None => "Password authentication: not configured",
        };

        let token_auth = token_result.is_ok();
        let healthy = token_auth || password_auth == Some(true);
        info!(healthy, token_auth, ?password_auth, "Frappe health check complete");

        HealthReport {
            healthy,
            token_auth,
            password_auth,
            message: format!("{}; {}", token_status, password_status),
        }
    }
}
