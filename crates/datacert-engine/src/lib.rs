pub mod aggregate;
pub mod cancel;
pub mod runner;

pub use aggregate::ReportBuilder;
pub use cancel::CancelToken;
pub use runner::{RunOptions, Runner};
