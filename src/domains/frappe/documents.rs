//! Document operations: CRUD, listing, counting and whitelisted methods.

use serde_json::{Map, Value, json};
use tracing::info;

use super::backend::{FrappeBackend, take_field};
use super::client::{ApiRequest, Method};
use super::error::FrappeError;
use super::filters::normalize_optional;

/// ERPNext method behind bank reconciliation.
pub const RECONCILE_VOUCHERS_METHOD: &str =
    "erpnext.accounts.doctype.bank_reconciliation_tool.bank_reconciliation_tool.reconcile_vouchers";

/// Parameters of a document listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub doctype: String,
    /// Canonical triples; build with [`ListQuery::with_filters`].
    pub filters: Option<Value>,
    pub fields: Option<Vec<String>>,
    /// Page size. `Some(0)` lifts Frappe's default limit of 20.
    pub limit: Option<u32>,
    pub limit_start: Option<u32>,
    pub order_by: Option<String>,
}

impl ListQuery {
    pub fn new(doctype: impl Into<String>) -> Self {
        Self {
            doctype: doctype.into(),
            ..Self::default()
        }
    }

    /// Attach caller filters in any supported shape.
    pub fn with_filters(mut self, raw: Option<Value>) -> Result<Self, FrappeError> {
        self.filters = normalize_optional(raw)?;
        Ok(self)
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn into_request(self) -> ApiRequest {
        let mut request = ApiRequest::resource(Method::Get, &self.doctype);
        if let Some(fields) = &self.fields {
            request = request.with_json_query("fields", &json!(fields));
        }
        if let Some(filters) = &self.filters {
            request = request.with_json_query("filters", filters);
        }
        if let Some(limit) = self.limit {
            request = request.with_query("limit_page_length", limit.to_string());
        }
        if let Some(start) = self.limit_start {
            request = request.with_query("limit_start", start.to_string());
        }
        if let Some(order_by) = self.order_by {
            request = request.with_query("order_by", order_by);
        }
        request
    }
}

impl FrappeBackend {
    pub async fn get_document(
        &self,
        doctype: &str,
        name: &str,
        fields: Option<&[String]>,
    ) -> Result<Value, FrappeError> {
        info!("Fetching {} {}", doctype, name);
        let mut request = ApiRequest::document(Method::Get, doctype, name);
        if let Some(fields) = fields {
            request = request.with_json_query("fields", &json!(fields));
        }
        take_field(self.send(request).await?, "data")
    }

    pub async fn list_documents(&self, query: ListQuery) -> Result<Vec<Value>, FrappeError> {
        info!("Listing {} documents", query.doctype);
        match take_field(self.send(query.into_request()).await?, "data")? {
            Value::Array(items) => Ok(items),
            other => Err(FrappeError::decode(format!(
                "expected a list of documents, got {}",
                other
            ))),
        }
    }

    pub async fn create_document(
        &self,
        doctype: &str,
        values: Map<String, Value>,
    ) -> Result<Value, FrappeError> {
        info!("Creating {} document", doctype);
        let request = ApiRequest::resource(Method::Post, doctype).with_body(Value::Object(values));
        take_field(self.send(request).await?, "data")
    }

    pub async fn update_document(
        &self,
        doctype: &str,
        name: &str,
        values: Map<String, Value>,
    ) -> Result<Value, FrappeError> {
        info!("Updating {} {}", doctype, name);
        let request =
            ApiRequest::document(Method::Put, doctype, name).with_body(Value::Object(values));
        take_field(self.send(request).await?, "data")
    }

    pub async fn delete_document(&self, doctype: &str, name: &str) -> Result<(), FrappeError> {
        info!("Deleting {} {}", doctype, name);
        self.send(ApiRequest::document(Method::Delete, doctype, name))
            .await
            .map(|_| ())
    }

    /// Call a whitelisted server method and return its `message`.
    pub async fn call_method(
        &self,
        method: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<Value, FrappeError> {
        info!("Calling method {}", method);
        let request = ApiRequest::method(Method::Post, method)
            .with_body(Value::Object(params.unwrap_or_default()));
        let mut body = self.send(request).await?;
        Ok(match body.get_mut("message") {
            Some(message) => message.take(),
            None => body,
        })
    }

    /// Number of documents matching canonical `filters`.
    pub async fn count_documents(
        &self,
        doctype: &str,
        filters: Option<&Value>,
    ) -> Result<u64, FrappeError> {
        let mut request = ApiRequest::method(Method::Get, "frappe.client.get_count")
            .with_query("doctype", doctype);
        if let Some(filters) = filters {
            request = request.with_json_query("filters", filters);
        }
        let message = take_field(self.send(request).await?, "message")?;
        message
            .as_u64()
            .ok_or_else(|| FrappeError::decode(format!("expected a count, got {}", message)))
    }

    pub async fn document_exists(&self, doctype: &str, name: &str) -> Result<bool, FrappeError> {
        let filters = json!([["name", "=", name]]);
        Ok(self.count_documents(doctype, Some(&filters)).await? > 0)
    }

    /// Match a bank transaction against payment/journal vouchers.
    pub async fn reconcile_bank_transaction(
        &self,
        bank_transaction_name: &str,
        vouchers: &[Value],
    ) -> Result<Value, FrappeError> {
        if vouchers.is_empty() {
            return Err(FrappeError::invalid_input(
                "At least one voucher is required to reconcile a bank transaction",
            ));
        }
        let mut params = Map::new();
        params.insert("bank_transaction_name".into(), json!(bank_transaction_name));
        // The ERPNext endpoint expects vouchers as a JSON-encoded string.
        params.insert("vouchers".into(), json!(Value::from(vouchers).to_string()));
        self.call_method(RECONCILE_VOUCHERS_METHOD, Some(params)).await
    }
}
