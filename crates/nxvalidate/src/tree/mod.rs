//! Interface to the external NeXus data tree.
//!
//! The engine never owns tree nodes. It reads them through [`NexusGroup`] and
//! [`NexusField`], which a file-backed model (or [`MemoryGroup`] in tests)
//! implements.

mod memory;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use memory::{MemoryField, MemoryGroup};

/// Storage representation of a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    String,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Compound, opaque or otherwise unrecognized HDF5 types.
    Opaque,
}

impl StorageType {
    /// Returns true for signed integer storage.
    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            StorageType::I8 | StorageType::I16 | StorageType::I32 | StorageType::I64
        )
    }

    /// Returns true for unsigned integer storage.
    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            StorageType::U8 | StorageType::U16 | StorageType::U32 | StorageType::U64
        )
    }

    /// Returns true for any integer storage.
    pub fn is_integer(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    /// Returns true for floating-point storage.
    pub fn is_float(&self) -> bool {
        matches!(self, StorageType::F32 | StorageType::F64)
    }

    pub fn label(&self) -> &'static str {
        match self {
            StorageType::String => "string",
            StorageType::Bool => "bool",
            StorageType::I8 => "int8",
            StorageType::I16 => "int16",
            StorageType::I32 => "int32",
            StorageType::I64 => "int64",
            StorageType::U8 => "uint8",
            StorageType::U16 => "uint16",
            StorageType::U32 => "uint32",
            StorageType::U64 => "uint64",
            StorageType::F32 => "float32",
            StorageType::F64 => "float64",
            StorageType::Opaque => "opaque",
        }
    }
}

/// Materialized values of a field, flattened in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum FieldValue {
    Text(Vec<String>),
    Int(Vec<i64>),
    UInt(Vec<u64>),
    Float(Vec<f64>),
    Bool(Vec<bool>),
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            FieldValue::Text(v) => v.len(),
            FieldValue::Int(v) => v.len(),
            FieldValue::UInt(v) => v.len(),
            FieldValue::Float(v) => v.len(),
            FieldValue::Bool(v) => v.len(),
            FieldValue::Bytes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The string values, if this is a text field.
    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Whether every element is strictly positive. `None` for non-integer values.
    pub fn all_positive(&self) -> Option<bool> {
        match self {
            FieldValue::Int(v) => Some(v.iter().all(|x| *x > 0)),
            FieldValue::UInt(v) => Some(v.iter().all(|x| *x > 0)),
            _ => None,
        }
    }

    /// Short rendering for finding messages.
    pub fn describe(&self) -> String {
        match self {
            FieldValue::Text(v) if v.len() == 1 => v[0].clone(),
            FieldValue::Text(v) => format!("{:?}", v),
            FieldValue::Int(v) => format!("{:?}", v),
            FieldValue::UInt(v) => format!("{:?}", v),
            FieldValue::Float(v) => format!("{:?}", v),
            FieldValue::Bool(v) => format!("{:?}", v),
            FieldValue::Bytes(v) => format!("<{} bytes>", v.len()),
        }
    }
}

/// A value-bearing leaf node.
pub trait NexusField {
    /// Field name within its parent group.
    fn name(&self) -> &str;

    /// Storage type of the underlying dataset.
    fn storage_type(&self) -> StorageType;

    /// Ordered dimension lengths. An empty shape is a scalar.
    fn shape(&self) -> &[usize];

    /// The `units` attribute, if declared.
    fn units(&self) -> Option<&str>;

    /// Materialize the value. Lazy implementations may fail here.
    fn load(&self) -> Result<FieldValue>;

    /// Target path when this field is a link to another dataset.
    fn link_target(&self) -> Option<&str> {
        None
    }

    fn rank(&self) -> usize {
        self.shape().len()
    }

    fn element_count(&self) -> usize {
        self.shape().iter().product()
    }
}

/// A node holding child fields and child groups.
pub trait NexusGroup {
    /// Group name within its parent.
    fn name(&self) -> &str;

    /// NeXus base class, e.g. `NXentry`.
    fn nx_class(&self) -> &str;

    /// Child group by name.
    fn group(&self, name: &str) -> Option<&dyn NexusGroup>;

    /// Child field by name.
    fn field(&self, name: &str) -> Option<&dyn NexusField>;

    /// All child groups in storage order.
    fn groups(&self) -> Vec<&dyn NexusGroup>;

    /// Child groups of the given NeXus class.
    fn groups_of_class(&self, nx_class: &str) -> Vec<&dyn NexusGroup> {
        self.groups()
            .into_iter()
            .filter(|g| g.nx_class() == nx_class)
            .collect()
    }

    /// Child group by name, falling back to the single child of `nx_class`.
    ///
    /// NXDL allows groups to be declared by type only; generated walkers look
    /// them up this way.
    fn group_named_or_unique(&self, name: Option<&str>, nx_class: &str) -> Option<&dyn NexusGroup> {
        if let Some(name) = name {
            return self.group(name).filter(|g| g.nx_class() == nx_class);
        }
        let mut matches = self.groups_of_class(nx_class);
        if matches.len() == 1 {
            matches.pop()
        } else {
            None
        }
    }
}
