//! Whitelisted method calls and bank reconciliation.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::domains::frappe::{FrappeBackend, FrappeError};
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::handlers::ToolOutput;

/// Parameters for call_method.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CallMethodParams {
    #[schemars(description = "Dotted path of a whitelisted method, e.g. 'frappe.client.get_list'")]
    pub method: String,

    #[schemars(description = "Keyword arguments passed to the method")]
    pub params: Option<Map<String, Value>>,
}

/// One voucher to match against a bank transaction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Voucher {
    #[schemars(description = "Voucher DocType, e.g. 'Payment Entry' or 'Journal Entry'")]
    pub payment_doctype: String,

    #[schemars(description = "Voucher name")]
    pub payment_name: String,

    #[schemars(description = "Amount allocated to the bank transaction")]
    pub amount: f64,
}

/// Parameters for reconcile_bank_transaction_with_vouchers.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReconcileBankTransactionParams {
    #[schemars(description = "Name of the Bank Transaction document")]
    pub bank_transaction_name: String,

    #[schemars(description = "Vouchers to reconcile against the transaction")]
    pub vouchers: Vec<Voucher>,
}

pub struct CallMethodTool;

#[async_trait]
impl ToolDefinition for CallMethodTool {
    const NAME: &'static str = "call_method";
    const DESCRIPTION: &'static str = "Call a whitelisted Frappe server method. Use for operations not covered by the document tools, such as submitting or cancelling documents.";
    type Params = CallMethodParams;

    #[instrument(skip_all, fields(method = %params.method))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        if params.method.trim().is_empty() {
            return Err(FrappeError::invalid_input("'method' must not be empty"));
        }
        let result = backend.call_method(&params.method, params.params).await?;
        Ok(ToolOutput::json(result))
    }
}

pub struct ReconcileBankTransactionTool;

#[async_trait]
impl ToolDefinition for ReconcileBankTransactionTool {
    const NAME: &'static str = "reconcile_bank_transaction_with_vouchers";
    const DESCRIPTION: &'static str = "Reconcile an ERPNext Bank Transaction against one or more payment or journal vouchers.";
    type Params = ReconcileBankTransactionParams;

    #[instrument(skip_all, fields(bank_transaction = %params.bank_transaction_name))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let vouchers = params
            .vouchers
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FrappeError::decode(e.to_string()))?;
        let result = backend
            .reconcile_bank_transaction(&params.bank_transaction_name, &vouchers)
            .await?;
        Ok(ToolOutput::summarized(
            format!(
                "Reconciled {} with {} voucher(s)",
                params.bank_transaction_name,
                vouchers.len()
            ),
            result,
        ))
    }
}
