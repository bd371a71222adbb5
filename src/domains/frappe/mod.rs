//! Frappe domain module.
//!
//! Everything that knows about the Frappe backend lives here:
//!
//! - `client.rs` - the [`FrappeApi`] seam and its `reqwest` implementation
//! - `auth.rs` - [`AuthCoordinator`]: single-flight login, session TTL, health probes
//! - `filters.rs` - filter shorthand normalization
//! - `backend.rs` - [`FrappeBackend`], the authenticated facade used by tools
//! - `documents.rs`, `schema.rs`, `guide.rs` - operations on top of the facade
//! - `error.rs` - [`FrappeError`] and backend error-body decoding

pub mod auth;
pub mod backend;
pub mod client;
pub mod documents;
mod error;
pub mod filters;
pub mod guide;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthCoordinator, HealthReport, SESSION_TTL};
pub use backend::FrappeBackend;
pub use client::{ApiRequest, AuthMode, FrappeApi, HttpFrappeClient, Method};
pub use documents::ListQuery;
pub use error::{ErrorDetail, FrappeError};
pub use filters::{FilterExpression, FilterValue, normalize_filters};
pub use schema::{DocField, DocTypeSchema, DocTypeSearch, FieldOptions, NamingInfo};
