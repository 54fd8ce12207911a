//! Validation report accumulated over one run.

use serde::{Deserialize, Serialize};

use super::finding::{Finding, FindingKind, Severity};

/// Ordered findings of one top-level validation run.
///
/// Findings are never deduplicated; two identical problems count twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding.
    pub fn record(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Append an error finding.
    pub fn add_error(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.record(Finding::error(FindingKind::General, location, message));
    }

    /// Append a warning finding.
    pub fn add_warning(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.record(Finding::warning(FindingKind::General, location, message));
    }

    /// True iff no error-severity findings exist.
    pub fn is_valid(&self) -> bool {
        !self.findings.iter().any(Finding::is_error)
    }

    /// All findings in insertion order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }

    /// Findings recorded at `location`.
    pub fn at<'a>(&'a self, location: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.location == location)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// One-line verdict.
    pub fn summary(&self) -> String {
        if self.is_valid() {
            format!("Validation passed with {} warnings", self.warning_count())
        } else {
            format!(
                "Validation failed with {} errors and {} warnings",
                self.error_count(),
                self.warning_count()
            )
        }
    }
}
