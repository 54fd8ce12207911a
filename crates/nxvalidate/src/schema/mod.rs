//! Schema vocabulary: unit categories, data types, dimensions and
//! declarative application definitions.

mod definition;
mod dims;
mod types;
mod units;

pub use definition::{DefinitionSchema, FieldSpec, GroupSpec};
pub use dims::Dim;
pub use types::{is_iso8601, Compatibility, NexusDataType};
pub use units::{parse_units, Dimensions, UnitCategory};
