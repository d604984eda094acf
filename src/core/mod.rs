// Public modules
pub mod error;
pub mod job;
pub mod output;
pub mod repo;
pub mod task;
pub mod vcs;

// Internal modules - not part of public API
pub(crate) mod paths;

// Public modules for CLI access
pub mod config;
pub mod defaults;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use output::{BulkSummary, ExecutionReport, ReportEntry};
