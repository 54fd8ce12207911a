//! Built-in application definitions expressed as data.

use crate::dims;
use crate::schema::{DefinitionSchema, FieldSpec, GroupSpec, NexusDataType, UnitCategory};

/// Fields every time-of-flight entry starts with.
fn entry_header(definition: &str) -> GroupSpec {
    GroupSpec::unnamed("NXentry")
        .field(FieldSpec::new("title"))
        .field(FieldSpec::new("start_time").of_type(NexusDataType::DateTime))
        .field(
            FieldSpec::new("definition")
                .of_type(NexusDataType::Char)
                .enumeration([definition]),
        )
}

fn chopper(name: &str, nx_class: &str) -> GroupSpec {
    GroupSpec::named(name, nx_class)
        .optional()
        .field(
            FieldSpec::new("rotation_speed")
                .of_type(NexusDataType::Float)
                .units(UnitCategory::Frequency),
        )
        .field(
            FieldSpec::new("energy")
                .of_type(NexusDataType::Float)
                .units(UnitCategory::Energy),
        )
}

/// `NXdirecttof`: direct-geometry time-of-flight spectrometer.
pub fn direct_tof() -> DefinitionSchema {
    DefinitionSchema::new(
        "NXdirecttof",
        entry_header("NXdirecttof").group(
            GroupSpec::unnamed("NXinstrument")
                .group(chopper("fermi_chopper", "NXfermi_chopper"))
                .group(chopper("disk_chopper", "NXdisk_chopper")),
        ),
    )
    .with_description("Direct-geometry time-of-flight neutron spectrometer")
}

/// `NXindirecttof`: indirect-geometry time-of-flight spectrometer.
pub fn indirect_tof() -> DefinitionSchema {
    let per_detector = |name: &str, category: UnitCategory| {
        FieldSpec::new(name)
            .of_type(NexusDataType::Float)
            .units(category)
            .dims(dims!["nDet"])
    };

    DefinitionSchema::new(
        "NXindirecttof",
        entry_header("NXindirecttof").group(
            GroupSpec::unnamed("NXinstrument").group(
                GroupSpec::named("analyser", "NXmonochromator")
                    .field(per_detector("energy", UnitCategory::Energy))
                    .field(per_detector("polar_angle", UnitCategory::Angle))
                    .field(per_detector("distance", UnitCategory::Length)),
            ),
        ),
    )
    .with_description("Indirect-geometry time-of-flight neutron spectrometer")
}

/// `NXlauetof`: time-of-flight Laue diffraction.
///
/// The monitor keeps the detector's dimension symbols so `nTOF` must agree
/// between detector and monitor; it is therefore walked right after the
/// instrument.
pub fn laue_tof() -> DefinitionSchema {
    let detector = GroupSpec::unnamed("NXdetector")
        .field(
            FieldSpec::new("polar_angle")
                .of_type(NexusDataType::Float)
                .units(UnitCategory::Angle)
                .dims(dims!["nDet"]),
        )
        .field(
            FieldSpec::new("azimuthal_angle")
                .of_type(NexusDataType::Float)
                .units(UnitCategory::Angle)
                .dims(dims!["nDet"]),
        )
        .field(
            FieldSpec::new("data")
                .of_type(NexusDataType::Int)
                .units(UnitCategory::Any)
                .dims(dims!["nXPixels", "nYPixels", "nTOF"]),
        )
        .field(
            FieldSpec::new("x_pixel_size")
                .of_type(NexusDataType::Float)
                .units(UnitCategory::Length),
        )
        .field(
            FieldSpec::new("y_pixel_size")
                .of_type(NexusDataType::Float)
                .units(UnitCategory::Length),
        )
        .field(
            FieldSpec::new("distance")
                .of_type(NexusDataType::Float)
                .units(UnitCategory::Length),
        )
        .field(
            FieldSpec::new("time_of_flight")
                .of_type(NexusDataType::Float)
                .units(UnitCategory::TimeOfFlight)
                .dims(dims!["nTOF"]),
        );

    let sample = GroupSpec::unnamed("NXsample")
        .field(FieldSpec::new("name").of_type(NexusDataType::Char))
        .field(
            FieldSpec::new("orientation_matrix")
                .of_type(NexusDataType::Float)
                .dims(dims![3usize, 3usize]),
        )
        .field(
            FieldSpec::new("unit_cell")
                .of_type(NexusDataType::Float)
                .units(UnitCategory::Length)
                .dims(dims![6usize]),
        );

    let control = GroupSpec::named("control", "NXmonitor")
        .reset_dimensions(false)
        .field(
            FieldSpec::new("mode")
                .of_type(NexusDataType::Char)
                .enumeration(["monitor", "timer"]),
        )
        .field(
            FieldSpec::new("preset")
                .of_type(NexusDataType::Float)
                .units(UnitCategory::Any),
        )
        .field(
            FieldSpec::new("data")
                .of_type(NexusDataType::Int)
                .units(UnitCategory::Any)
                .dims(dims!["nTOF"]),
        )
        .field(
            FieldSpec::new("time_of_flight")
                .of_type(NexusDataType::Float)
                .units(UnitCategory::TimeOfFlight)
                .dims(dims!["nTOF"]),
        );

    let plottable = GroupSpec::unnamed("NXdata")
        .field(FieldSpec::new("data").link("/NXentry/NXinstrument/NXdetector/data"))
        .field(
            FieldSpec::new("time_of_flight")
                .link("/NXentry/NXinstrument/NXdetector/time_of_flight"),
        );

    DefinitionSchema::new(
        "NXlauetof",
        GroupSpec::unnamed("NXentry")
            .field(
                FieldSpec::new("definition")
                    .of_type(NexusDataType::Char)
                    .enumeration(["NXlauetof"]),
            )
            .group(GroupSpec::unnamed("NXinstrument").group(detector))
            .group(control)
            .group(sample)
            .group(plottable),
    )
    .with_description("Time-of-flight Laue diffraction")
}

/// Every built-in definition.
pub fn all() -> Vec<DefinitionSchema> {
    vec![direct_tof(), indirect_tof(), laue_tof()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_definitions_are_well_formed() {
        for schema in all() {
            schema.check().unwrap();
        }
    }

    #[test]
    fn test_definition_field_pins_name() {
        for schema in all() {
            let definition = schema
                .entry
                .fields
                .iter()
                .find(|f| f.name == "definition")
                .unwrap();
            assert_eq!(definition.enumeration, vec![schema.name.clone()]);
        }
    }
}
