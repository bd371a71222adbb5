//! Scripted in-memory [`FrappeApi`] for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::client::{ApiRequest, AuthMode, FrappeApi};
use super::error::FrappeError;
use crate::core::config::CredentialsConfig;

type Responder = Box<dyn Fn(&ApiRequest) -> Result<Value, FrappeError> + Send + Sync>;

pub struct FakeFrappe {
    requests: Mutex<Vec<(ApiRequest, AuthMode)>>,
    responder: Responder,
    logins: AtomicUsize,
    login_delay: Duration,
    accept_logins: bool,
}

impl FakeFrappe {
    /// Answers every request with an empty `data` list and accepts logins.
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(|_| Ok(json!({ "data": [] }))),
            logins: AtomicUsize::new(0),
            login_delay: Duration::ZERO,
            accept_logins: true,
        }
    }

    pub fn respond_with<F>(mut self, responder: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<Value, FrappeError> + Send + Sync + 'static,
    {
        self.responder = Box::new(responder);
        self
    }

    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }

    pub fn rejecting_logins(mut self) -> Self {
        self.accept_logins = false;
        self
    }

    pub fn requests(&self) -> Vec<(ApiRequest, AuthMode)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrappeApi for FakeFrappe {
    async fn request(&self, request: ApiRequest, auth: AuthMode) -> Result<Value, FrappeError> {
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push((request, auth));
        response
    }

    async fn login(&self, _username: &str, _password: &str) -> Result<(), FrappeError> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }
        if self.accept_logins {
            Ok(())
        } else {
            Err(FrappeError::Authentication("Invalid login credentials".to_string()))
        }
    }
}

pub fn token_credentials() -> CredentialsConfig {
    CredentialsConfig {
        api_key: Some("test-key".to_string()),
        api_secret: Some("test-secret".to_string()),
        ..Default::default()
    }
}

pub fn login_credentials() -> CredentialsConfig {
    CredentialsConfig {
        username: Some("administrator".to_string()),
        password: Some("admin".to_string()),
        ..Default::default()
    }
}

/// A `getdoctype` response for a small DocType used across tests.
pub fn sample_schema() -> Value {
    json!({
        "docs": [{
            "name": "Task",
            "module": "Projects",
            "autoname": "TASK-.YYYY.-.#####",
            "naming_rule": "Expression (old style)",
            "title_field": "subject",
            "is_submittable": 0,
            "istable": 0,
            "issingle": 0,
            "fields": [
                {"fieldname": "subject", "label": "Subject", "fieldtype": "Data", "reqd": 1},
                {"fieldname": "status", "label": "Status", "fieldtype": "Select",
                 "options": "Open\nWorking\n\nCompleted", "reqd": 0},
                {"fieldname": "project", "label": "Project", "fieldtype": "Link",
                 "options": "Project", "reqd": 1},
                {"fieldname": "description", "label": "Description", "fieldtype": "Text Editor"}
            ]
        }]
    })
}
