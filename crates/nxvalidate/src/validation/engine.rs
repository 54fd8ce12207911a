//! Check library shared by every application-definition walker.
//!
//! Each check inspects one node against one constraint and records at most
//! one finding. What happens after a failure depends on the run's
//! [`PropagationPolicy`]:
//!
//! - `CollectAndContinue`: the check returns `Ok(false)` (or `Ok(None)` for
//!   presence checks) and the walker skips only the dependent branch.
//! - `FailFast`: the check returns `Err(Abort)`, which walkers propagate with
//!   `?` to end the run.

use tracing::debug;

use crate::error::NexusError;
use crate::schema::{Compatibility, Dim, NexusDataType, UnitCategory};
use crate::tree::{FieldValue, NexusField, NexusGroup};
use crate::validator::{PropagationPolicy, ValidationConfig};

use super::finding::{Finding, FindingKind};
use super::report::ValidationReport;
use super::resolver::DimensionTable;

/// Stop signal carrying the finding that ended a fail-fast run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort(pub Finding);

impl From<Abort> for NexusError {
    fn from(abort: Abort) -> Self {
        NexusError::Invalid {
            location: abort.0.location,
            message: abort.0.message,
        }
    }
}

/// Outcome of a check: a continue signal, or an abort under fail-fast.
pub type CheckResult<T> = std::result::Result<T, Abort>;

/// Validation state for one top-level run.
///
/// Holds the report, the dimension symbol table, the current group path and
/// the entry context. Construct a fresh engine per run.
pub struct ValidationEngine<'t> {
    config: ValidationConfig,
    report: ValidationReport,
    dimensions: DimensionTable,
    path: Vec<String>,
    entry: Option<&'t dyn NexusGroup>,
}

impl<'t> ValidationEngine<'t> {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            report: ValidationReport::new(),
            dimensions: DimensionTable::new(),
            path: Vec::new(),
            entry: None,
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn into_report(self) -> ValidationReport {
        self.report
    }

    pub fn dimensions(&self) -> &DimensionTable {
        &self.dimensions
    }

    // =========================================================================
    // PATHS AND CONTEXT
    // =========================================================================

    /// Slash-separated location of `name` under the current group.
    pub fn location(&self, name: Option<&str>) -> String {
        let mut location = String::new();
        for segment in self.path.iter().map(String::as_str).chain(name) {
            location.push('/');
            location.push_str(segment);
        }
        if location.is_empty() {
            location.push('/');
        }
        location
    }

    /// Run `f` with `name` pushed onto the group path.
    pub fn in_group<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        let pushed = !name.is_empty();
        if pushed {
            self.path.push(name.to_string());
        }
        let result = f(self);
        if pushed {
            self.path.pop();
        }
        result
    }

    /// Set the entry (or subentry) that link targets resolve from.
    pub fn set_entry(&mut self, entry: &'t dyn NexusGroup) {
        self.entry = Some(entry);
    }

    pub fn entry(&self) -> Option<&'t dyn NexusGroup> {
        self.entry
    }

    // =========================================================================
    // RECORDING
    // =========================================================================

    /// Record an error finding for `name` and apply the propagation policy.
    pub fn fail(
        &mut self,
        kind: FindingKind,
        name: Option<&str>,
        message: impl Into<String>,
    ) -> CheckResult<()> {
        let finding = Finding::error(kind, self.location(name), message);
        debug!(check = kind.label(), location = %finding.location, "{}", finding.message);
        self.report.record(finding.clone());
        match self.config.policy {
            PropagationPolicy::FailFast => Err(Abort(finding)),
            PropagationPolicy::CollectAndContinue => Ok(()),
        }
    }

    /// Record a warning finding if warnings are enabled.
    pub fn warn(&mut self, kind: FindingKind, name: Option<&str>, message: impl Into<String>) {
        if !self.config.report_warnings {
            return;
        }
        let finding = Finding::warning(kind, self.location(name), message);
        debug!(check = kind.label(), location = %finding.location, "{}", finding.message);
        self.report.record(finding);
    }

    // =========================================================================
    // PRESENCE CHECKS
    // =========================================================================

    /// Fails if a required group is absent. Returns the group to descend into.
    pub fn group_not_null<'g>(
        &mut self,
        name: Option<&str>,
        nx_class: &str,
        group: Option<&'g dyn NexusGroup>,
    ) -> CheckResult<Option<&'g dyn NexusGroup>> {
        if group.is_none() {
            let label = name.unwrap_or(nx_class);
            self.fail(
                FindingKind::GroupNotNull,
                Some(label),
                format!("{}: required group of type {} not present", label, nx_class),
            )?;
        }
        Ok(group)
    }

    /// Fails if a required field is absent, has zero elements, or its value
    /// cannot be loaded.
    pub fn field_not_null<'f>(
        &mut self,
        name: &str,
        field: Option<&'f dyn NexusField>,
    ) -> CheckResult<Option<&'f dyn NexusField>> {
        match field {
            None => {
                self.fail(
                    FindingKind::FieldNotNull,
                    Some(name),
                    format!("{}: required field not present", name),
                )?;
                Ok(None)
            }
            Some(f) if f.element_count() == 0 => {
                self.fail(
                    FindingKind::FieldNotNull,
                    Some(name),
                    format!("{}: required field is empty (shape {:?})", name, f.shape()),
                )?;
                Ok(None)
            }
            Some(f) => Ok(self.load_value(name, f)?.map(|_| f)),
        }
    }

    /// Warn if a recommended group is absent.
    pub fn recommended_group<'g>(
        &mut self,
        name: Option<&str>,
        nx_class: &str,
        group: Option<&'g dyn NexusGroup>,
    ) -> Option<&'g dyn NexusGroup> {
        if group.is_none() {
            let label = name.unwrap_or(nx_class);
            self.warn(
                FindingKind::Recommended,
                Some(label),
                format!("{}: recommended group of type {} not present", label, nx_class),
            );
        }
        group
    }

    /// Warn if a recommended field is absent.
    pub fn recommended_field<'f>(
        &mut self,
        name: &str,
        field: Option<&'f dyn NexusField>,
    ) -> Option<&'f dyn NexusField> {
        if field.is_none() {
            self.warn(
                FindingKind::Recommended,
                Some(name),
                format!("{}: recommended field not present", name),
            );
        }
        field
    }

    /// Counts children of `child_class` under `parent`.
    ///
    /// Fails when `required` and none exist, or when more than one exists and
    /// `allows_multiple` is false.
    pub fn unnamed_group_occurrences(
        &mut self,
        parent: &dyn NexusGroup,
        child_class: &str,
        required: bool,
        allows_multiple: bool,
    ) -> CheckResult<bool> {
        let count = parent.groups_of_class(child_class).len();
        let message = if required && count == 0 {
            format!("{}: at least one group of this type is required, found none", child_class)
        } else if !allows_multiple && count > 1 {
            format!("{}: at most one group of this type is allowed, found {}", child_class, count)
        } else {
            return Ok(true);
        };
        self.fail(FindingKind::GroupOccurrences, Some(child_class), message)?;
        Ok(false)
    }

    // =========================================================================
    // CONSTRAINT CHECKS
    // =========================================================================

    /// Fails if the field's storage (or, where needed, its values) is not
    /// compatible with `expected`.
    pub fn field_type(
        &mut self,
        name: &str,
        field: &dyn NexusField,
        expected: NexusDataType,
    ) -> CheckResult<bool> {
        let storage = field.storage_type();
        match expected.storage_compatibility(storage) {
            Compatibility::Compatible => Ok(true),
            Compatibility::Incompatible => {
                self.fail(
                    FindingKind::FieldType,
                    Some(name),
                    format!(
                        "{}: {} storage ({}) is not compatible with {}",
                        name,
                        storage.label(),
                        NexusDataType::classify(storage),
                        expected
                    ),
                )?;
                Ok(false)
            }
            Compatibility::NeedsValues => {
                let Some(value) = self.load_value(name, field)? else {
                    return Ok(false);
                };
                if expected.values_conform(&value) {
                    return Ok(true);
                }
                self.fail(
                    FindingKind::FieldType,
                    Some(name),
                    format!("{}: value {} is not a valid {}", name, value.describe(), expected),
                )?;
                Ok(false)
            }
        }
    }

    /// Fails if the declared unit is not in `expected`.
    pub fn field_units(
        &mut self,
        name: &str,
        field: &dyn NexusField,
        expected: UnitCategory,
    ) -> CheckResult<bool> {
        let units = field.units();
        if expected.accepts(units) {
            return Ok(true);
        }
        let message = match units.map(str::trim).filter(|u| !u.is_empty()) {
            None => format!("{}: no units declared, expected {}", name, expected),
            Some(u) if expected == UnitCategory::None => {
                format!("{}: units '{}' declared where none are expected", name, u)
            }
            Some(u) => format!("{}: units '{}' are not {}", name, u, expected),
        };
        self.fail(FindingKind::FieldUnits, Some(name), message)?;
        Ok(false)
    }

    /// Fails unless every element of the value is one of `allowed`.
    ///
    /// Matching is exact and case-sensitive.
    pub fn field_enumeration<S: AsRef<str>>(
        &mut self,
        name: &str,
        field: &dyn NexusField,
        allowed: &[S],
    ) -> CheckResult<bool> {
        let Some(value) = self.load_value(name, field)? else {
            return Ok(false);
        };
        let rejected: Vec<String> = value_strings(&value)
            .into_iter()
            .filter(|v| !allowed.iter().any(|a| a.as_ref() == v.as_str()))
            .collect();
        if rejected.is_empty() {
            return Ok(true);
        }

        let allowed = allowed
            .iter()
            .map(|a| format!("'{}'", a.as_ref()))
            .collect::<Vec<_>>()
            .join(", ");
        self.fail(
            FindingKind::FieldEnumeration,
            Some(name),
            format!(
                "{}: value '{}' is not one of the allowed values [{}]",
                name,
                rejected.join("', '"),
                allowed
            ),
        )?;
        Ok(false)
    }

    /// Fails if the field does not have exactly `expected` dimensions.
    pub fn field_rank(
        &mut self,
        name: &str,
        field: &dyn NexusField,
        expected: usize,
    ) -> CheckResult<bool> {
        let rank = field.rank();
        if rank == expected {
            return Ok(true);
        }
        self.fail(
            FindingKind::FieldRank,
            Some(name),
            format!(
                "{}: expected rank {} but field has rank {} (shape {:?})",
                name,
                expected,
                rank,
                field.shape()
            ),
        )?;
        Ok(false)
    }

    /// Checks each dimension against a fixed length or a symbol.
    ///
    /// Symbols are resolved through the current scope's table. All mismatched
    /// positions go into a single finding.
    pub fn field_dimensions(
        &mut self,
        name: &str,
        field: &dyn NexusField,
        dims: &[Dim],
    ) -> CheckResult<bool> {
        if !self.field_rank(name, field, dims.len())? {
            return Ok(false);
        }

        let location = self.location(Some(name));
        let mut problems = Vec::new();
        for (index, (dim, &actual)) in dims.iter().zip(field.shape()).enumerate() {
            match dim {
                Dim::Fixed(expected) if *expected != actual => problems.push(format!(
                    "dimension {}: expected {}, found {}",
                    index, expected, actual
                )),
                Dim::Fixed(_) => {}
                Dim::Symbol(symbol) => {
                    if let Err(mismatch) = self.dimensions.resolve(symbol, actual, &location) {
                        problems.push(format!("dimension {}: {}", index, mismatch));
                    }
                }
            }
        }
        if problems.is_empty() {
            return Ok(true);
        }

        self.fail(
            FindingKind::FieldDimensions,
            Some(name),
            format!("{}: {}", name, problems.join("; ")),
        )?;
        Ok(false)
    }

    /// Forget dimension symbols bound so far.
    ///
    /// Walkers call this after confirming a group exists and before checking
    /// its dimensioned fields.
    pub fn clear_local_group_dimension_placeholder_values(&mut self) {
        self.dimensions.clear();
    }

    // =========================================================================
    // LINKS
    // =========================================================================

    /// Resolve an NXDL link target such as `/NXentry/NXinstrument/NXdetector/data`
    /// from the current entry.
    ///
    /// `NX`-prefixed segments select the single child of that class; other
    /// segments select a child by name. The last segment names the field.
    pub fn resolve_link_target(&self, target: &str) -> Option<&'t dyn NexusField> {
        let entry = self.entry?;
        let mut segments: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
        let field_name = segments.pop()?;

        let mut group = entry;
        for (index, segment) in segments.into_iter().enumerate() {
            let names_entry =
                segment == "NXentry" || segment == entry.nx_class() || segment == entry.name();
            if index == 0 && names_entry {
                continue;
            }
            group = if segment.starts_with("NX") {
                group.group_named_or_unique(None, segment)?
            } else {
                group.group(segment)?
            };
        }
        group.field(field_name)
    }

    /// Fails if `target` does not resolve from the entry, or resolves to data
    /// of a different shape. A plain dataset where a link is expected is a
    /// warning.
    pub fn field_link_target(
        &mut self,
        name: &str,
        field: &dyn NexusField,
        target: &str,
    ) -> CheckResult<bool> {
        let Some(entry) = self.entry else {
            self.fail(
                FindingKind::LinkTarget,
                Some(name),
                format!("{}: no entry context to resolve link target '{}'", name, target),
            )?;
            return Ok(false);
        };
        let Some(resolved) = self.resolve_link_target(target) else {
            self.fail(
                FindingKind::LinkTarget,
                Some(name),
                format!(
                    "{}: link target '{}' does not resolve from entry '{}'",
                    name,
                    target,
                    entry.name()
                ),
            )?;
            return Ok(false);
        };
        if resolved.shape() != field.shape() {
            self.fail(
                FindingKind::LinkTarget,
                Some(name),
                format!(
                    "{}: shape {:?} differs from link target '{}' shape {:?}",
                    name,
                    field.shape(),
                    target,
                    resolved.shape()
                ),
            )?;
            return Ok(false);
        }
        if field.link_target().is_none() {
            self.warn(
                FindingKind::LinkTarget,
                Some(name),
                format!("{}: expected a link to '{}' but found a plain dataset", name, target),
            );
        }
        Ok(true)
    }

    // =========================================================================
    // VALUES
    // =========================================================================

    /// Materialize a field value; a load failure counts as an absent value.
    fn load_value(
        &mut self,
        name: &str,
        field: &dyn NexusField,
    ) -> CheckResult<Option<FieldValue>> {
        match field.load() {
            Ok(value) if value.is_empty() => {
                self.fail(
                    FindingKind::FieldNotNull,
                    Some(name),
                    format!("{}: required field is empty", name),
                )?;
                Ok(None)
            }
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                debug!(field = name, error = %err, "field value unavailable");
                self.fail(
                    FindingKind::FieldNotNull,
                    Some(name),
                    format!("{}: value not available ({})", name, err),
                )?;
                Ok(None)
            }
        }
    }
}

fn value_strings(value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::Text(v) => v.clone(),
        FieldValue::Int(v) => v.iter().map(ToString::to_string).collect(),
        FieldValue::UInt(v) => v.iter().map(ToString::to_string).collect(),
        FieldValue::Float(v) => v.iter().map(ToString::to_string).collect(),
        FieldValue::Bool(v) => v.iter().map(ToString::to_string).collect(),
        FieldValue::Bytes(v) => v.iter().map(ToString::to_string).collect(),
    }
}
