//! Built-in guidance for tool callers: API instructions and usage notes.
//!
//! Nothing here talks to the network except [`FrappeBackend::usage_info`],
//! which enriches the static text with a DocType summary.

use std::fmt::Write as _;

use super::backend::FrappeBackend;
use super::error::FrappeError;

/// `(category, operation, text)`
const INSTRUCTIONS: &[(&str, &str, &str)] = &[
    (
        "DOCUMENT_OPERATIONS",
        "CREATE",
        "Use create_document with 'doctype' and a 'values' object. Call get_required_fields \
         first; every mandatory field must be present. Child tables are arrays of objects \
         under the table fieldname.",
    ),
    (
        "DOCUMENT_OPERATIONS",
        "GET",
        "Use get_document with 'doctype' and 'name'. Pass 'fields' to limit the returned \
         columns. Use check_document_exists when only existence matters.",
    ),
    (
        "DOCUMENT_OPERATIONS",
        "UPDATE",
        "Use update_document with 'doctype', 'name' and a 'values' object holding only the \
         fields to change. Submitted documents cannot be edited.",
    ),
    (
        "DOCUMENT_OPERATIONS",
        "DELETE",
        "Use delete_document with 'doctype' and 'name'. Linked or submitted documents \
         must be cancelled or unlinked first.",
    ),
    (
        "DOCUMENT_OPERATIONS",
        "LIST",
        "Use list_documents with 'doctype'. Optional: 'filters', 'fields', 'limit', \
         'order_by' (e.g. 'modified desc') and 'limit_start' for paging.",
    ),
    (
        "DOCUMENT_OPERATIONS",
        "COUNT",
        "Use get_document_count with 'doctype' and optional 'filters'.",
    ),
    (
        "SCHEMA_OPERATIONS",
        "GET_SCHEMA",
        "Use get_doctype_schema with 'doctype' to see fields, types, options and \
         mandatory flags.",
    ),
    (
        "SCHEMA_OPERATIONS",
        "GET_FIELD_OPTIONS",
        "Use get_field_options with 'doctype' and 'fieldname'. Select fields return their \
         choices; Link fields return names from the linked DocType (optionally filtered).",
    ),
    (
        "SCHEMA_OPERATIONS",
        "DISCOVERY",
        "Use get_module_list, get_doctypes_in_module and find_doctypes to locate the right \
         DocType before working with documents.",
    ),
    (
        "ADVANCED_OPERATIONS",
        "CALL_METHOD",
        "Use call_method with a dotted 'method' path of a whitelisted server method and an \
         optional 'params' object.",
    ),
    (
        "ADVANCED_OPERATIONS",
        "BANK_RECONCILIATION",
        "Use reconcile_bank_transaction_with_vouchers with 'bank_transaction_name' and \
         'vouchers', each voucher carrying payment_doctype, payment_name and amount.",
    ),
    (
        "BEST_PRACTICES",
        "FILTERS",
        "Filters accept {\"field\": value} for equality, {\"field\": [\"operator\", value]} \
         for other operators (like, not like, in, not in, >, <, >=, <=, !=, between, is) \
         and the native [[\"field\", \"operator\", value]] list.",
    ),
    (
        "BEST_PRACTICES",
        "ERROR_HANDLING",
        "Failed calls return isError=true with the HTTP status, the Frappe exception and \
         any server messages. Validation errors usually name the offending field.",
    ),
    (
        "BEST_PRACTICES",
        "NAMING",
        "Use get_naming_info to learn whether a DocType expects a 'name', a naming series \
         or generates names itself.",
    ),
];

/// Steps for common multi-document workflows.
const WORKFLOWS: &[(&str, &str)] = &[
    (
        "sales",
        "Customer -> Quotation -> Sales Order -> Delivery Note -> Sales Invoice -> Payment Entry",
    ),
    (
        "purchase",
        "Supplier -> Material Request -> Purchase Order -> Purchase Receipt -> Purchase Invoice -> Payment Entry",
    ),
    (
        "project",
        "Project -> Task -> Timesheet -> Sales Invoice (billing)",
    ),
    (
        "bank_reconciliation",
        "Bank Transaction -> find matching Payment Entry / Journal Entry -> reconcile_bank_transaction_with_vouchers",
    ),
];

const GENERAL_USAGE: &str = "Frappe stores data as documents of a DocType. Discover DocTypes \
with find_doctypes or get_module_list, inspect them with get_doctype_schema and \
get_required_fields, then read and write documents with the document tools.";

/// Instructions for one category/operation pair.
pub fn api_instructions(category: &str, operation: &str) -> Result<&'static str, FrappeError> {
    INSTRUCTIONS
        .iter()
        .find(|(c, o, _)| c.eq_ignore_ascii_case(category) && o.eq_ignore_ascii_case(operation))
        .map(|(_, _, text)| *text)
        .ok_or_else(|| {
            let available: Vec<String> = INSTRUCTIONS
                .iter()
                .map(|(c, o, _)| format!("{}/{}", c, o))
                .collect();
            FrappeError::invalid_input(format!(
                "No instructions for {}/{}. Available: {}",
                category,
                operation,
                available.join(", ")
            ))
        })
}

fn workflow_steps(workflow: &str) -> Option<&'static str> {
    WORKFLOWS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(workflow))
        .map(|(_, steps)| *steps)
}

impl FrappeBackend {
    /// Usage notes, optionally specific to a DocType and/or workflow.
    pub async fn usage_info(
        &self,
        doctype: Option<&str>,
        workflow: Option<&str>,
    ) -> Result<String, FrappeError> {
        let mut out = String::from(GENERAL_USAGE);

        if let Some(doctype) = doctype {
            let schema = self.get_doctype_schema(doctype).await?;
            let _ = write!(out, "\n\nDocType '{}'", schema.name);
            if let Some(module) = &schema.module {
                let _ = write!(out, " (module {})", module);
            }
            if schema.is_submittable {
                out.push_str(" is submittable: create as draft, then submit via call_method.");
            }
            if schema.istable {
                out.push_str(" is a child table; edit it through its parent document.");
            }
            if schema.issingle {
                out.push_str(" is a single: use its DocType name as the document name.");
            }
            let required: Vec<&str> = schema
                .data_fields()
                .filter(|f| f.reqd)
                .map(|f| f.fieldname.as_str())
                .collect();
            if !required.is_empty() {
                let _ = write!(out, "\nRequired fields: {}", required.join(", "));
            }
        }

        if let Some(workflow) = workflow {
            match workflow_steps(workflow) {
                Some(steps) => {
                    let _ = write!(out, "\n\nWorkflow '{}': {}", workflow, steps);
                }
                None => {
                    let known: Vec<&str> = WORKFLOWS.iter().map(|(name, _)| *name).collect();
                    let _ = write!(
                        out,
                        "\n\nNo guidance for workflow '{}'. Known workflows: {}",
                        workflow,
                        known.join(", ")
                    );
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::frappe::backend::test_support::backend;
    use crate::domains::frappe::testing::{FakeFrappe, sample_schema, token_credentials};
    use std::sync::Arc;

    #[test]
    fn test_instructions_lookup_is_case_insensitive() {
        let text = api_instructions("document_operations", "create").unwrap();
        assert!(text.contains("create_document"));
    }

    #[test]
    fn test_unknown_instructions_list_available() {
        let err = api_instructions("NOPE", "NOPE").unwrap_err();
        assert!(err.to_string().contains("BEST_PRACTICES/FILTERS"));
    }

    #[tokio::test]
    async fn test_usage_info_without_arguments_is_offline() {
        let fake = Arc::new(FakeFrappe::new());
        let backend = backend(&fake, token_credentials());
        let text = backend.usage_info(None, Some("sales")).await.unwrap();
        assert!(text.contains("Sales Order"));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_usage_info_summarizes_doctype() {
        let fake = Arc::new(FakeFrappe::new().respond_with(|_| Ok(sample_schema())));
        let backend = backend(&fake, token_credentials());
        let text = backend.usage_info(Some("Task"), Some("unknown")).await.unwrap();
        assert!(text.contains("DocType 'Task' (module Projects)"));
        assert!(text.contains("Required fields: subject, project"));
        assert!(text.contains("Known workflows"));
    }
}
