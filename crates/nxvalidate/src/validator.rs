//! Top-level validation entry points and run configuration.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::definitions::{ApplicationValidator, DefinitionRegistry};
use crate::error::{NexusError, Result};
use crate::tree::NexusGroup;
use crate::validation::{CheckResult, FindingKind, ValidationEngine, ValidationReport};

/// What a failed check does to the rest of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationPolicy {
    /// Record the finding, skip only the dependent branch, keep going.
    #[default]
    CollectAndContinue,
    /// Record the finding and end the run.
    FailFast,
}

/// Configuration for one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub policy: PropagationPolicy,
    /// Record warnings (recommended nodes, plain datasets where links are expected).
    pub report_warnings: bool,
    /// Whether entering a group clears dimension symbols, unless the
    /// definition says otherwise for that group.
    pub reset_dimensions_per_group: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            policy: PropagationPolicy::CollectAndContinue,
            report_warnings: false,
            reset_dimensions_per_group: true,
        }
    }
}

impl ValidationConfig {
    /// Default configuration with the fail-fast policy.
    pub fn fail_fast() -> Self {
        Self {
            policy: PropagationPolicy::FailFast,
            ..Self::default()
        }
    }

    pub fn with_warnings(mut self) -> Self {
        self.report_warnings = true;
        self
    }

    pub fn with_policy(mut self, policy: PropagationPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Validates NeXus trees against registered application definitions.
///
/// Every call builds a fresh engine, so one validator can be shared across
/// threads and reused without findings leaking between runs.
#[derive(Debug, Default)]
pub struct NexusValidator {
    config: ValidationConfig,
    registry: DefinitionRegistry,
}

impl NexusValidator {
    /// A validator with the built-in definitions and default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            registry: DefinitionRegistry::with_builtin(),
        }
    }

    pub fn with_registry(mut self, registry: DefinitionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DefinitionRegistry {
        &mut self.registry
    }

    /// Validate every `NXentry` under `root`, each against the definition
    /// named by its `definition` field.
    ///
    /// `NXsubentry` groups carrying their own `definition` are dispatched
    /// too. Returns `Err(NexusError::Invalid)` on the first failure under
    /// the fail-fast policy.
    pub fn validate_root(&self, root: &dyn NexusGroup) -> Result<ValidationReport> {
        let mut engine = ValidationEngine::new(self.config.clone());
        engine.unnamed_group_occurrences(root, "NXentry", true, true)?;

        for entry in root.groups_of_class("NXentry") {
            self.dispatch_entry(&mut engine, entry)?;
        }
        Ok(self.finish(engine, root.name()))
    }

    /// Validate one entry against a named definition.
    pub fn validate_entry(
        &self,
        entry: &dyn NexusGroup,
        definition: &str,
    ) -> Result<ValidationReport> {
        let validator = self
            .registry
            .get(definition)
            .ok_or_else(|| NexusError::UnknownDefinition(definition.to_string()))?;
        self.validate_with(validator, entry)
    }

    /// Validate one entry with a specific validator, bypassing the registry.
    pub fn validate_with(
        &self,
        validator: &dyn ApplicationValidator,
        entry: &dyn NexusGroup,
    ) -> Result<ValidationReport> {
        let mut engine = ValidationEngine::new(self.config.clone());
        self.run_definition(&mut engine, validator, entry)?;
        Ok(self.finish(engine, entry.name()))
    }

    fn dispatch_entry<'t>(
        &self,
        engine: &mut ValidationEngine<'t>,
        entry: &'t dyn NexusGroup,
    ) -> CheckResult<()> {
        let subentries = entry.groups_of_class("NXsubentry");
        match definition_of(entry) {
            Some(name) => match self.registry.get(&name) {
                Some(validator) => self.run_definition(engine, validator, entry)?,
                None => engine.in_group(entry.name(), |engine| {
                    engine.fail(
                        FindingKind::Definition,
                        Some("definition"),
                        format!("definition: no validator registered for '{}'", name),
                    )
                })?,
            },
            None if subentries.is_empty() => engine.in_group(entry.name(), |engine| {
                engine.warn(
                    FindingKind::Definition,
                    Some("definition"),
                    "definition: entry names no application definition",
                )
            }),
            None => {}
        }

        engine.in_group(entry.name(), |engine| {
            for subentry in subentries {
                if definition_of(subentry).is_some() {
                    self.dispatch_entry(engine, subentry)?;
                }
            }
            Ok(())
        })
    }

    fn run_definition<'t>(
        &self,
        engine: &mut ValidationEngine<'t>,
        validator: &dyn ApplicationValidator,
        entry: &'t dyn NexusGroup,
    ) -> CheckResult<()> {
        let _span = info_span!(
            "validate_entry",
            entry = entry.name(),
            definition = validator.definition()
        )
        .entered();

        let before = engine.report().error_count();
        engine.set_entry(entry);
        engine.clear_local_group_dimension_placeholder_values();
        validator.validate_entry(engine, entry)?;
        debug!(
            errors = engine.report().error_count() - before,
            "entry checked"
        );
        Ok(())
    }

    fn finish(&self, engine: ValidationEngine<'_>, name: &str) -> ValidationReport {
        let report = engine.into_report();
        info!(
            tree = name,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "{}",
            report.summary()
        );
        report
    }
}

/// The entry's `definition` value, if present and readable.
fn definition_of(entry: &dyn NexusGroup) -> Option<String> {
    let field = entry.field("definition")?;
    match field.load() {
        Ok(value) => value
            .as_text()
            .and_then(|v| v.first())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        Err(err) => {
            debug!(entry = entry.name(), error = %err, "definition unreadable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{MemoryField, MemoryGroup};

    fn minimal_entry(name: &str, definition: &str) -> MemoryGroup {
        MemoryGroup::new(name, "NXentry")
            .with_field(MemoryField::text("title", "empty can"))
            .with_field(MemoryField::text("start_time", "2024-02-29 17:00:00"))
            .with_field(MemoryField::text("definition", definition))
            .with_group(MemoryGroup::new("instrument", "NXinstrument"))
    }

    #[test]
    fn test_config_defaults() {
        let config = ValidationConfig::default();
        assert_eq!(config.policy, PropagationPolicy::CollectAndContinue);
        assert!(!config.report_warnings);
        assert!(config.reset_dimensions_per_group);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: ValidationConfig = serde_json::from_str(r#"{"policy": "fail_fast"}"#).unwrap();
        assert_eq!(config, ValidationConfig::fail_fast());
    }

    #[test]
    fn test_root_dispatches_by_definition() {
        let root = MemoryGroup::new("", "NXroot").with_group(minimal_entry("entry", "NXdirecttof"));

        let report = NexusValidator::new().validate_root(&root).unwrap();
        assert!(report.is_valid(), "{:?}", report.findings());
    }

    #[test]
    fn test_root_without_entries() {
        let root = MemoryGroup::new("", "NXroot");

        let report = NexusValidator::new().validate_root(&root).unwrap();
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.findings()[0].kind, FindingKind::GroupOccurrences);
    }

    #[test]
    fn test_unknown_definition_is_a_finding() {
        let root = MemoryGroup::new("", "NXroot").with_group(minimal_entry("entry", "NXmx"));

        let report = NexusValidator::new().validate_root(&root).unwrap();
        assert_eq!(report.error_count(), 1);
        let finding = &report.findings()[0];
        assert_eq!(finding.kind, FindingKind::Definition);
        assert_eq!(finding.location, "/entry/definition");
    }

    #[test]
    fn test_validate_entry_unknown_definition() {
        let entry = minimal_entry("entry", "NXmx");
        let err = NexusValidator::new().validate_entry(&entry, "NXmx").unwrap_err();
        assert!(matches!(err, NexusError::UnknownDefinition(ref name) if name == "NXmx"));
    }

    #[test]
    fn test_subentries_dispatched() {
        let entry = MemoryGroup::new("entry", "NXentry")
            .with_group(minimal_entry("direct", "NXdirecttof").with_class("NXsubentry"))
            .with_group(minimal_entry("indirect", "NXdirecttof").with_class("NXsubentry"));
        let root = MemoryGroup::new("", "NXroot").with_group(entry);

        let validator = NexusValidator::with_config(ValidationConfig::default().with_warnings());
        let report = validator.validate_root(&root).unwrap();
        assert!(report.is_empty(), "{:?}", report.findings());
    }

    #[test]
    fn test_entry_without_definition_warns() {
        let root = MemoryGroup::new("", "NXroot").with_group(MemoryGroup::new("entry", "NXentry"));

        let quiet = NexusValidator::new().validate_root(&root).unwrap();
        assert!(quiet.is_empty());

        let loud = NexusValidator::with_config(ValidationConfig::default().with_warnings())
            .validate_root(&root)
            .unwrap();
        assert_eq!(loud.warning_count(), 1);
        assert!(loud.is_valid());
    }

    #[test]
    fn test_fail_fast_surfaces_as_error() {
        let mut entry = minimal_entry("entry", "NXdirecttof");
        entry.remove_field("title");
        let root = MemoryGroup::new("", "NXroot").with_group(entry);

        let err = NexusValidator::with_config(ValidationConfig::fail_fast())
            .validate_root(&root)
            .unwrap_err();
        match err {
            NexusError::Invalid { location, message } => {
                assert_eq!(location, "/entry/title");
                assert_eq!(message, "title: required field not present");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
