//! Check library, findings and the report they accumulate into.

mod engine;
mod finding;
mod report;
mod resolver;

pub use engine::{Abort, CheckResult, ValidationEngine};
pub use finding::{Finding, FindingKind, Severity};
pub use report::ValidationReport;
pub use resolver::{DimensionMismatch, DimensionTable};
