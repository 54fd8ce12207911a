//! nxvalidate: validation engine for NeXus application definitions.
//!
//! An application definition names the groups and fields a NeXus file must
//! contain for one class of experiment. nxvalidate checks a tree against such
//! a definition and reports every problem it finds, each with a path and a
//! message.
//!
//! # Core Principles
//!
//! - **One engine**: a single check library, run under a selectable
//!   [`PropagationPolicy`] (collect every finding, or stop at the first)
//! - **Definitions as data**: application definitions are [`DefinitionSchema`]
//!   values interpreted by one generic walker
//! - **No shared state**: every run owns its report and dimension table
//!
//! # Example
//!
//! ```
//! use nxvalidate::{MemoryField, MemoryGroup, NexusValidator};
//!
//! let root = MemoryGroup::new("", "NXroot").with_group(
//!     MemoryGroup::new("entry", "NXentry")
//!         .with_field(MemoryField::text("start_time", "2023-11-02T09:15:00Z"))
//!         .with_field(MemoryField::text("definition", "NXdirecttof"))
//!         .with_group(MemoryGroup::new("instrument", "NXinstrument")),
//! );
//!
//! let report = NexusValidator::new().validate_root(&root).unwrap();
//! assert!(!report.is_valid());
//! assert_eq!(report.findings()[0].message, "title: required field not present");
//! ```

pub mod definitions;
pub mod error;
pub mod schema;
pub mod tree;
pub mod validation;

mod validator;

pub use crate::validator::{NexusValidator, PropagationPolicy, ValidationConfig};
pub use definitions::{ApplicationValidator, DefinitionRegistry, SchemaWalker};
pub use error::{NexusError, Result};
pub use schema::{DefinitionSchema, Dim, FieldSpec, GroupSpec, NexusDataType, UnitCategory};
pub use tree::{FieldValue, MemoryField, MemoryGroup, NexusField, NexusGroup, StorageType};
pub use validation::{Finding, FindingKind, Severity, ValidationEngine, ValidationReport};
