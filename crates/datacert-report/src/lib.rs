pub mod json;
pub mod markdown;
pub mod writer;

pub use json::{REPORT_SCHEMA, REPORT_SCHEMA_VERSION, ReportPayload, to_json};
pub use markdown::to_markdown;
pub use writer::{ReportPaths, write_reports};
