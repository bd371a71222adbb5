//! Document tools module.
//!
//! - `crud`: create, read, update and delete single documents
//! - `list`: listing, counting and existence checks
//! - `method`: whitelisted server methods and bank reconciliation

pub mod crud;
pub mod list;
pub mod method;

pub use crud::{CreateDocumentTool, DeleteDocumentTool, GetDocumentTool, UpdateDocumentTool};
pub use list::{CheckDocumentExistsTool, GetDocumentCountTool, ListDocumentsTool};
pub use method::{CallMethodTool, ReconcileBankTransactionTool};
