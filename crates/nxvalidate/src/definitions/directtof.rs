//! `NXdirecttof` written out as a fixed call sequence.
//!
//! Equivalent to the declarative [`builtin::direct_tof`](super::builtin::direct_tof)
//! definition; kept for callers that want a walker with no schema to
//! interpret.

use crate::schema::{NexusDataType, UnitCategory};
use crate::tree::NexusGroup;
use crate::validation::{CheckResult, ValidationEngine};

use super::ApplicationValidator;

const DEFINITION: &str = "NXdirecttof";

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectTofValidator;

impl DirectTofValidator {
    fn validate_entry_group<'t>(
        &self,
        engine: &mut ValidationEngine<'t>,
        entry: &'t dyn NexusGroup,
    ) -> CheckResult<()> {
        engine.in_group(entry.name(), |engine| {
            if engine.config().reset_dimensions_per_group {
                engine.clear_local_group_dimension_placeholder_values();
            }

            // title
            engine.field_not_null("title", entry.field("title"))?;

            // start_time
            if let Some(field) = engine.field_not_null("start_time", entry.field("start_time"))? {
                engine.field_type("start_time", field, NexusDataType::DateTime)?;
            }

            // definition
            if let Some(field) = engine.field_not_null("definition", entry.field("definition"))? {
                engine.field_type("definition", field, NexusDataType::Char)?;
                engine.field_enumeration("definition", field, &[DEFINITION])?;
            }

            engine.unnamed_group_occurrences(entry, "NXinstrument", true, false)?;
            for instrument in entry.groups_of_class("NXinstrument") {
                self.validate_instrument_group(engine, instrument)?;
            }
            Ok(())
        })
    }

    fn validate_instrument_group<'t>(
        &self,
        engine: &mut ValidationEngine<'t>,
        instrument: &'t dyn NexusGroup,
    ) -> CheckResult<()> {
        engine.in_group(instrument.name(), |engine| {
            if engine.config().reset_dimensions_per_group {
                engine.clear_local_group_dimension_placeholder_values();
            }
            if let Some(chopper) =
                instrument.group_named_or_unique(Some("fermi_chopper"), "NXfermi_chopper")
            {
                self.validate_chopper_group(engine, chopper)?;
            }
            if let Some(chopper) =
                instrument.group_named_or_unique(Some("disk_chopper"), "NXdisk_chopper")
            {
                self.validate_chopper_group(engine, chopper)?;
            }
            Ok(())
        })
    }

    fn validate_chopper_group<'t>(
        &self,
        engine: &mut ValidationEngine<'t>,
        chopper: &'t dyn NexusGroup,
    ) -> CheckResult<()> {
        engine.in_group(chopper.name(), |engine| {
            if engine.config().reset_dimensions_per_group {
                engine.clear_local_group_dimension_placeholder_values();
            }

            // rotation_speed
            let rotation_speed = chopper.field("rotation_speed");
            if let Some(field) = engine.field_not_null("rotation_speed", rotation_speed)? {
                engine.field_type("rotation_speed", field, NexusDataType::Float)?;
                engine.field_units("rotation_speed", field, UnitCategory::Frequency)?;
            }

            // energy
            if let Some(field) = engine.field_not_null("energy", chopper.field("energy"))? {
                engine.field_type("energy", field, NexusDataType::Float)?;
                engine.field_units("energy", field, UnitCategory::Energy)?;
            }
            Ok(())
        })
    }
}

impl ApplicationValidator for DirectTofValidator {
    fn definition(&self) -> &str {
        DEFINITION
    }

    fn validate_entry<'t>(
        &self,
        engine: &mut ValidationEngine<'t>,
        entry: &'t dyn NexusGroup,
    ) -> CheckResult<()> {
        self.validate_entry_group(engine, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{builtin, SchemaWalker};
    use crate::tree::{MemoryField, MemoryGroup};
    use crate::validation::ValidationReport;
    use crate::validator::ValidationConfig;

    fn chopper(name: &str, nx_class: &str, speed_units: &str) -> MemoryGroup {
        MemoryGroup::new(name, nx_class)
            .with_field(MemoryField::float("rotation_speed", 150.0).with_units(speed_units))
            .with_field(MemoryField::float("energy", 25.0).with_units("meV"))
    }

    fn entry(definition: &str) -> MemoryGroup {
        MemoryGroup::new("entry", "NXentry")
            .with_field(MemoryField::text("title", "vanadium"))
            .with_field(MemoryField::text("start_time", "2023-11-02T09:15:00Z"))
            .with_field(MemoryField::text("definition", definition))
            .with_group(
                MemoryGroup::new("instrument", "NXinstrument")
                    .with_group(chopper("fermi_chopper", "NXfermi_chopper", "Hz"))
                    .with_group(chopper("disk_chopper", "NXdisk_chopper", "m")),
            )
    }

    fn run(validator: &dyn ApplicationValidator, entry: &MemoryGroup) -> ValidationReport {
        let mut engine = ValidationEngine::new(ValidationConfig::default());
        engine.set_entry(entry);
        validator.validate_entry(&mut engine, entry).unwrap();
        engine.into_report()
    }

    #[test]
    fn test_matches_declarative_definition() {
        let walker = SchemaWalker::new(builtin::direct_tof());
        for tree in [entry("NXdirecttof"), entry("NXindirecttof")] {
            assert_eq!(run(&DirectTofValidator, &tree), run(&walker, &tree));
        }
    }

    #[test]
    fn test_reports_bad_chopper_units() {
        let report = run(&DirectTofValidator, &entry("NXdirecttof"));

        assert_eq!(report.error_count(), 1);
        assert_eq!(
            report.findings()[0].location,
            "/entry/instrument/disk_chopper/rotation_speed"
        );
    }

    #[test]
    fn test_choppers_are_optional() {
        let mut tree = entry("NXdirecttof");
        tree.group_mut("instrument").unwrap().remove_group("disk_chopper");

        assert!(run(&DirectTofValidator, &tree).is_valid());
    }
}
