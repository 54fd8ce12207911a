//! Example: validate an in-memory NeXus tree.
//!
//! Builds an `NXindirecttof` entry with a detector-count mismatch, validates it
//! under both propagation policies and prints the findings.
//!
//! Usage:
//!   cargo run --example validate_tree
//!
//! Set `RUST_LOG=debug` to see each failed check as it is recorded.

use nxvalidate::{
    MemoryField, MemoryGroup, NexusValidator, PropagationPolicy, Severity, ValidationConfig,
};
use tracing_subscriber::EnvFilter;

fn build_tree() -> MemoryGroup {
    let analyser = MemoryGroup::new("analyser", "NXmonochromator")
        .with_field(MemoryField::floats("energy", vec![1.84; 5]).with_units("meV"))
        .with_field(MemoryField::floats("polar_angle", vec![45.0; 7]).with_units("degrees"))
        .with_field(MemoryField::floats("distance", vec![0.9; 5]).with_units("s"));

    let entry = MemoryGroup::new("entry", "NXentry")
        .with_field(MemoryField::text("start_time", "2023-11-03T14:00:00+01:00"))
        .with_field(MemoryField::text("definition", "NXindirecttof"))
        .with_group(MemoryGroup::new("instrument", "NXinstrument").with_group(analyser));

    MemoryGroup::new("", "NXroot").with_group(entry)
}

fn main() -> nxvalidate::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let tree = build_tree();
    let separator = "=".repeat(80);

    for policy in [PropagationPolicy::CollectAndContinue, PropagationPolicy::FailFast] {
        println!("{}", separator);
        println!("Policy: {:?}", policy);
        println!("{}", separator);

        let config = ValidationConfig::default().with_policy(policy).with_warnings();
        match NexusValidator::with_config(config).validate_root(&tree) {
            Ok(report) => {
                for finding in report.findings() {
                    let marker = match finding.severity {
                        Severity::Error => "✗",
                        Severity::Warning => "!",
                    };
                    println!("  {} {}", marker, finding);
                }
                println!();
                println!("{}", report.summary());
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Err(err) => println!("  stopped: {}", err),
        }
        println!();
    }

    Ok(())
}
