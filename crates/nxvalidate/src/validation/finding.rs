//! Findings recorded during a validation run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Required group is absent.
    GroupNotNull,
    /// Required field is absent, empty or unreadable.
    FieldNotNull,
    /// Storage or values incompatible with the declared data type.
    FieldType,
    /// Declared unit outside the expected category.
    FieldUnits,
    /// Value not in the enumerated set.
    FieldEnumeration,
    /// Wrong number of dimensions.
    FieldRank,
    /// Fixed or symbolic dimension mismatch.
    FieldDimensions,
    /// Too few or too many groups of a type.
    GroupOccurrences,
    /// Link target unresolvable or inconsistent.
    LinkTarget,
    /// Missing or unknown application definition.
    Definition,
    /// Recommended node is absent.
    Recommended,
    /// Recorded directly through the report.
    General,
}

impl FindingKind {
    /// Get a human-readable label for the finding kind.
    pub fn label(&self) -> &'static str {
        match self {
            FindingKind::GroupNotNull => "Missing Group",
            FindingKind::FieldNotNull => "Missing Field",
            FindingKind::FieldType => "Type Mismatch",
            FindingKind::FieldUnits => "Unit Mismatch",
            FindingKind::FieldEnumeration => "Enumeration Violation",
            FindingKind::FieldRank => "Rank Mismatch",
            FindingKind::FieldDimensions => "Dimension Mismatch",
            FindingKind::GroupOccurrences => "Occurrence Violation",
            FindingKind::LinkTarget => "Link Target",
            FindingKind::Definition => "Definition",
            FindingKind::Recommended => "Recommended",
            FindingKind::General => "General",
        }
    }
}

/// Severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Does not affect the verdict.
    Warning,
    /// Makes the tree invalid.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// One recorded validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    /// Slash-separated path of the node, e.g. `/entry/instrument/detector/data`.
    pub location: String,
    pub message: String,
}

impl Finding {
    /// Create an error finding.
    pub fn error(
        kind: FindingKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a warning finding.
    pub fn warning(
        kind: FindingKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity.label(), self.location, self.message)
    }
}
