//! Validation engine benchmarks.
//!
//! Measures unit parsing, whole-tree validation and scaling with the number
//! of entries in a file.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nxvalidate::definitions::{builtin, DirectTofValidator};
use nxvalidate::schema::parse_units;
use nxvalidate::{
    DefinitionRegistry, MemoryField, MemoryGroup, NexusValidator, SchemaWalker, UnitCategory,
};

/// Unit strings seen in real files.
const UNIT_SAMPLES: &[&str] = &[
    "meV",
    "mm",
    "us",
    "microsecond",
    "Angstrom",
    "1/angstrom",
    "kg/m^3",
    "g cm-3",
    "deg",
    "Hz",
    "counts",
    "mm.mrad",
    "1/s/cm^2",
    "furlongs",
    "",
];

fn laue_entry(name: &str, n_det: usize, n_tof: usize) -> MemoryGroup {
    let detector = MemoryGroup::new("detector", "NXdetector")
        .with_field(MemoryField::float_array("polar_angle", vec![n_det]).with_units("deg"))
        .with_field(MemoryField::float_array("azimuthal_angle", vec![n_det]).with_units("deg"))
        .with_field(MemoryField::int_array("data", vec![16, 16, n_tof]).with_units("counts"))
        .with_field(MemoryField::float("x_pixel_size", 1.5).with_units("mm"))
        .with_field(MemoryField::float("y_pixel_size", 1.5).with_units("mm"))
        .with_field(MemoryField::float("distance", 0.4).with_units("m"))
        .with_field(MemoryField::float_array("time_of_flight", vec![n_tof]).with_units("us"));

    MemoryGroup::new(name, "NXentry")
        .with_field(MemoryField::text("definition", "NXlauetof"))
        .with_group(MemoryGroup::new("instrument", "NXinstrument").with_group(detector))
        .with_group(
            MemoryGroup::new("control", "NXmonitor")
                .with_field(MemoryField::text("mode", "timer"))
                .with_field(MemoryField::float("preset", 600.0).with_units("s"))
                .with_field(MemoryField::int_array("data", vec![n_tof]).with_units("counts"))
                .with_field(
                    MemoryField::float_array("time_of_flight", vec![n_tof]).with_units("us"),
                ),
        )
        .with_group(
            MemoryGroup::new("sample", "NXsample")
                .with_field(MemoryField::text("name", "NaCl"))
                .with_field(MemoryField::float_array("orientation_matrix", vec![3, 3]))
                .with_field(MemoryField::float_array("unit_cell", vec![6]).with_units("angstrom")),
        )
        .with_group(
            MemoryGroup::new("data", "NXdata")
                .with_field(
                    MemoryField::int_array("data", vec![16, 16, n_tof])
                        .with_link_target(format!("/{}/instrument/detector/data", name)),
                )
                .with_field(
                    MemoryField::float_array("time_of_flight", vec![n_tof])
                        .with_link_target(format!("/{}/instrument/detector/time_of_flight", name)),
                ),
        )
}

fn direct_entry() -> MemoryGroup {
    let chopper = |name: &str, nx_class: &str| {
        MemoryGroup::new(name, nx_class)
            .with_field(MemoryField::float("rotation_speed", 300.0).with_units("Hz"))
            .with_field(MemoryField::float("energy", 60.0).with_units("meV"))
    };
    MemoryGroup::new("entry", "NXentry")
        .with_field(MemoryField::text("title", "Vanadium"))
        .with_field(MemoryField::text("start_time", "2023-11-02T09:15:00Z"))
        .with_field(MemoryField::text("definition", "NXdirecttof"))
        .with_group(
            MemoryGroup::new("instrument", "NXinstrument")
                .with_group(chopper("fermi_chopper", "NXfermi_chopper"))
                .with_group(chopper("disk_chopper", "NXdisk_chopper")),
        )
}

/// Benchmark unit parsing and classification.
fn bench_units(c: &mut Criterion) {
    let mut group = c.benchmark_group("units");

    group.bench_function("parse_batch_15", |b| {
        b.iter(|| {
            for sample in UNIT_SAMPLES {
                black_box(parse_units(sample));
            }
        })
    });

    group.bench_function("accepts_energy", |b| {
        b.iter(|| black_box(UnitCategory::Energy.accepts(Some("meV"))))
    });

    group.finish();
}

/// Benchmark validation of a single entry.
fn bench_validate_entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_entry");
    let validator = NexusValidator::new();

    let laue = MemoryGroup::new("", "NXroot").with_group(laue_entry("entry", 64, 1000));
    group.bench_function("laue_tof", |b| {
        b.iter(|| black_box(validator.validate_root(&laue)))
    });

    // Declarative walker against the hand-written call sequence.
    let direct = direct_entry();
    let walker = SchemaWalker::new(builtin::direct_tof());
    group.bench_function("direct_tof_schema", |b| {
        b.iter(|| black_box(validator.validate_with(&walker, &direct)))
    });
    group.bench_function("direct_tof_hand_written", |b| {
        b.iter(|| black_box(validator.validate_with(&DirectTofValidator, &direct)))
    });

    group.finish();
}

/// Benchmark how validation scales with the number of entries.
fn bench_entry_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("entry_scaling");
    let validator = NexusValidator::new();

    for count in [1usize, 10, 100] {
        let mut root = MemoryGroup::new("", "NXroot");
        for i in 0..count {
            root.add_group(laue_entry(&format!("entry{}", i), 16, 100));
        }
        group.bench_with_input(BenchmarkId::new("laue_tof", count), &root, |b, root| {
            b.iter(|| black_box(validator.validate_root(root)))
        });
    }

    group.finish();
}

/// Benchmark registry construction.
fn bench_registry_creation(c: &mut Criterion) {
    c.bench_function("registry_with_builtin", |b| {
        b.iter(|| black_box(DefinitionRegistry::with_builtin()))
    });
}

criterion_group!(
    benches,
    bench_units,
    bench_validate_entry,
    bench_entry_scaling,
    bench_registry_creation,
);
criterion_main!(benches);
