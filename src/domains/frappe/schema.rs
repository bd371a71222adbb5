//! DocType schema introspection.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use super::backend::{FrappeBackend, take_field};
use super::client::{ApiRequest, Method};
use super::documents::ListQuery;
use super::error::FrappeError;
use super::filters::FilterExpression;

/// Frappe stores flags as 0/1 integers, older sites as booleans or strings.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.as_str(), "1" | "true" | "True"),
        _ => false,
    })
}

/// `null` and missing both become an empty string.
fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One field of a DocType.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocField {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub fieldname: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub fieldtype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub reqd: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The parts of a DocType definition tools care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocTypeSchema {
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub autoname: Option<String>,
    #[serde(default)]
    pub naming_rule: Option<String>,
    #[serde(default)]
    pub title_field: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub is_submittable: bool,
    #[serde(default, deserialize_with = "flag")]
    pub istable: bool,
    #[serde(default, deserialize_with = "flag")]
    pub issingle: bool,
    #[serde(default)]
    pub fields: Vec<DocField>,
}

impl DocTypeSchema {
    pub fn field(&self, fieldname: &str) -> Option<&DocField> {
        self.fields.iter().find(|f| f.fieldname == fieldname)
    }

    /// Fields with the mandatory flag set.
    pub fn required_fields(&self) -> Vec<DocField> {
        self.fields.iter().filter(|f| f.reqd).cloned().collect()
    }

    /// Layout-only field types carry no data.
    pub fn data_fields(&self) -> impl Iterator<Item = &DocField> {
        const LAYOUT: [&str; 5] = ["Section Break", "Column Break", "Tab Break", "HTML", "Fold"];
        self.fields
            .iter()
            .filter(|f| !LAYOUT.contains(&f.fieldtype.as_str()))
    }
}

/// Choices for a Select, Link or Table field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldOptions {
    Select { options: Vec<String> },
    Link { doctype: String, values: Vec<Value> },
    Table { child_doctype: String },
}

/// How documents of a DocType get their names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamingInfo {
    pub doctype: String,
    pub autoname: Option<String>,
    pub naming_rule: Option<String>,
    pub title_field: Option<String>,
    /// Options of the `naming_series` field, when the DocType has one.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub naming_series: Vec<String>,
    pub explanation: String,
}

/// Filters for `find_doctypes`.
#[derive(Debug, Clone, Default)]
pub struct DocTypeSearch {
    pub search_term: Option<String>,
    pub module: Option<String>,
    pub is_table: Option<bool>,
    pub is_single: Option<bool>,
    pub is_custom: Option<bool>,
    pub limit: Option<u32>,
}

impl DocTypeSearch {
    fn into_query(self) -> ListQuery {
        let mut filters = Map::new();
        if let Some(term) = self.search_term.filter(|t| !t.is_empty()) {
            filters.insert("name".into(), json!(["like", format!("%{}%", term)]));
        }
        if let Some(module) = self.module {
            filters.insert("module".into(), json!(module));
        }
        for (field, value) in [
            ("istable", self.is_table),
            ("issingle", self.is_single),
            ("custom", self.is_custom),
        ] {
            if let Some(value) = value {
                filters.insert(field.into(), json!(u8::from(value)));
            }
        }

        let mut query = ListQuery::new("DocType")
            .with_fields(["name", "module", "istable", "issingle", "custom"])
            .with_limit(self.limit.unwrap_or(20));
        query.order_by = Some("name asc".to_string());
        if !filters.is_empty() {
            query.filters = Some(Value::Array(FilterExpression::from_map(filters).normalize()));
        }
        query
    }
}

fn split_select_options(options: &str) -> Vec<String> {
    options
        .lines()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

fn explain_autoname(autoname: Option<&str>) -> String {
    match autoname.map(str::trim).filter(|a| !a.is_empty()) {
        None | Some("hash") => {
            "Names are random hashes; omit 'name' when creating documents".to_string()
        }
        Some("Prompt") | Some("prompt") => {
            "The name must be supplied in the 'name' field when creating".to_string()
        }
        Some("autoincrement") => "Names are auto-incrementing integers".to_string(),
        Some(a) if a.starts_with("naming_series:") => {
            "Names come from the selected 'naming_series' field".to_string()
        }
        Some(a) if a.starts_with("field:") => format!(
            "Names are copied from the '{}' field",
            a.trim_start_matches("field:")
        ),
        Some(a) if a.starts_with("format:") => format!(
            "Names follow the format '{}'",
            a.trim_start_matches("format:")
        ),
        Some(a) => format!("Names follow the series pattern '{}'", a),
    }
}

impl FrappeBackend {
    /// Load a DocType definition, falling back to the DocType record when
    /// the desk endpoint is unavailable.
    pub async fn get_doctype_schema(&self, doctype: &str) -> Result<DocTypeSchema, FrappeError> {
        info!("Loading schema for {}", doctype);
        let request = ApiRequest::method(Method::Get, "frappe.desk.form.load.getdoctype")
            .with_query("doctype", doctype);

        let raw = match self.send(request).await {
            Ok(body) => {
                let docs = take_field(body, "docs")?;
                docs.as_array()
                    .and_then(|docs| {
                        docs.iter()
                            .find(|d| d.get("name").and_then(Value::as_str) == Some(doctype))
                            .or_else(|| docs.first())
                            .cloned()
                    })
                    .ok_or_else(|| {
                        FrappeError::decode(format!("no schema returned for {}", doctype))
                    })?
            }
            Err(FrappeError::Http { status, .. }) if status != 401 => {
                debug!(
                    "getdoctype returned HTTP {}, reading DocType record instead",
                    status
                );
                self.get_document("DocType", doctype, None).await?
            }
            Err(e) => return Err(e),
        };

        serde_json::from_value(raw).map_err(|e| FrappeError::decode(e.to_string()))
    }

    pub async fn get_field_options(
        &self,
        doctype: &str,
        fieldname: &str,
        filters: Option<Value>,
        limit: Option<u32>,
    ) -> Result<FieldOptions, FrappeError> {
        let schema = self.get_doctype_schema(doctype).await?;
        let field = schema.field(fieldname).ok_or_else(|| {
            FrappeError::invalid_input(format!(
                "Field '{}' not found in DocType '{}'",
                fieldname, doctype
            ))
        })?;
        let options = field.options.clone().unwrap_or_default();

        match field.fieldtype.as_str() {
            "Select" => Ok(FieldOptions::Select {
                options: split_select_options(&options),
            }),
            "Link" if !options.is_empty() => {
                let mut query = ListQuery::new(options.trim())
                    .with_filters(filters)?
                    .with_fields(["name"])
                    .with_limit(limit.unwrap_or(50));
                query.order_by = Some("name asc".to_string());
                let values = self.list_documents(query).await?;
                Ok(FieldOptions::Link {
                    doctype: options.trim().to_string(),
                    values,
                })
            }
            "Table" | "Table MultiSelect" if !options.is_empty() => Ok(FieldOptions::Table {
                child_doctype: options.trim().to_string(),
            }),
            other => Err(FrappeError::invalid_input(format!(
                "Field '{}' of DocType '{}' is of type '{}' and has no selectable options",
                fieldname, doctype, other
            ))),
        }
    }

    pub async fn find_doctypes(&self, search: DocTypeSearch) -> Result<Vec<Value>, FrappeError> {
        self.list_documents(search.into_query()).await
    }

    pub async fn get_module_list(&self) -> Result<Vec<Value>, FrappeError> {
        let mut query = ListQuery::new("Module Def")
            .with_fields(["name", "app_name"])
            .with_limit(0);
        query.order_by = Some("name asc".to_string());
        self.list_documents(query).await
    }

    pub async fn get_doctypes_in_module(&self, module: &str) -> Result<Vec<Value>, FrappeError> {
        let search = DocTypeSearch {
            module: Some(module.to_string()),
            limit: Some(0),
            ..Default::default()
        };
        self.find_doctypes(search).await
    }

    pub async fn doctype_exists(&self, doctype: &str) -> Result<bool, FrappeError> {
        self.document_exists("DocType", doctype).await
    }

    pub async fn get_required_fields(&self, doctype: &str) -> Result<Vec<DocField>, FrappeError> {
        Ok(self.get_doctype_schema(doctype).await?.required_fields())
    }

    pub async fn get_naming_info(&self, doctype: &str) -> Result<NamingInfo, FrappeError> {
        let schema = self.get_doctype_schema(doctype).await?;
        let naming_series = schema
            .field("naming_series")
            .and_then(|f| f.options.as_deref())
            .map(split_select_options)
            .unwrap_or_default();

        Ok(NamingInfo {
            explanation: explain_autoname(schema.autoname.as_deref()),
            doctype: schema.name,
            autoname: schema.autoname,
            naming_rule: schema.naming_rule,
            title_field: schema.title_field,
            naming_series,
        })
    }
}
