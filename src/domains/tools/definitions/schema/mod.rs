//! Schema tools module.
//!
//! - `doctype`: schema, existence, required fields, naming
//! - `fields`: options of Select/Link/Table fields
//! - `discovery`: searching DocTypes and modules

pub mod discovery;
pub mod doctype;
pub mod fields;

pub use discovery::{FindDoctypesTool, GetDoctypesInModuleTool, GetModuleListTool};
pub use doctype::{
    CheckDoctypeExistsTool, GetDoctypeSchemaTool, GetNamingInfoTool, GetRequiredFieldsTool,
};
pub use fields::GetFieldOptionsTool;
