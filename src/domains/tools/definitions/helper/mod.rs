//! Helper tools: connectivity check and built-in guidance.

pub mod guide;
pub mod ping;

pub use guide::{GetApiInstructionsTool, GetFrappeUsageInfoTool};
pub use ping::PingTool;
