//! NeXus data types and storage compatibility.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::NexusError;
use crate::tree::{FieldValue, StorageType};

/// Data type declared for a field in NXDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NexusDataType {
    /// Text.
    Char,
    /// Floating-point numbers.
    Float,
    /// Integers of any width or signedness.
    Int,
    /// Unsigned integers.
    UInt,
    /// Integers that are strictly positive.
    PosInt,
    /// Any integer or floating-point number.
    Number,
    Boolean,
    /// Raw bytes.
    Binary,
    /// ISO 8601 date-time text (`NX_DATE_TIME`, `ISO8601`).
    DateTime,
}

/// Whether a storage type satisfies an expected data type.
///
/// `NeedsValues` means the answer depends on the values and the caller must look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Compatible,
    Incompatible,
    /// Storage is acceptable; values must still satisfy the type.
    NeedsValues,
}

impl NexusDataType {
    /// NXDL spelling, e.g. `NX_FLOAT`.
    pub fn nxdl_name(&self) -> &'static str {
        match self {
            NexusDataType::Char => "NX_CHAR",
            NexusDataType::Float => "NX_FLOAT",
            NexusDataType::Int => "NX_INT",
            NexusDataType::UInt => "NX_UINT",
            NexusDataType::PosInt => "NX_POSINT",
            NexusDataType::Number => "NX_NUMBER",
            NexusDataType::Boolean => "NX_BOOLEAN",
            NexusDataType::Binary => "NX_BINARY",
            NexusDataType::DateTime => "NX_DATE_TIME",
        }
    }

    /// Classify a storage representation into its natural data type tag.
    pub fn classify(storage: StorageType) -> NexusDataType {
        match storage {
            StorageType::String => NexusDataType::Char,
            StorageType::Bool => NexusDataType::Boolean,
            s if s.is_float() => NexusDataType::Float,
            s if s.is_unsigned_integer() => NexusDataType::UInt,
            s if s.is_signed_integer() => NexusDataType::Int,
            _ => NexusDataType::Binary,
        }
    }

    /// Storage-level compatibility, including numeric widening.
    pub fn storage_compatibility(&self, storage: StorageType) -> Compatibility {
        use Compatibility::*;

        let ok = |cond: bool| if cond { Compatible } else { Incompatible };
        match self {
            NexusDataType::Char => ok(storage == StorageType::String),
            NexusDataType::Float => ok(storage.is_float()),
            NexusDataType::Int => ok(storage.is_integer()),
            NexusDataType::UInt => ok(storage.is_unsigned_integer()),
            NexusDataType::Number => ok(storage.is_integer() || storage.is_float()),
            // HDF5 has no boolean type; writers store flags as small integers.
            NexusDataType::Boolean => ok(storage == StorageType::Bool || storage.is_integer()),
            NexusDataType::Binary => ok(matches!(
                storage,
                StorageType::Opaque | StorageType::U8 | StorageType::I8
            )),
            NexusDataType::PosInt if storage.is_integer() => NeedsValues,
            NexusDataType::DateTime if storage == StorageType::String => NeedsValues,
            NexusDataType::PosInt | NexusDataType::DateTime => Incompatible,
        }
    }

    /// Value-level check for types that need one. Other types always pass.
    pub fn values_conform(&self, value: &FieldValue) -> bool {
        match self {
            NexusDataType::PosInt => value.all_positive().unwrap_or(false),
            NexusDataType::DateTime => value
                .as_text()
                .is_some_and(|texts| texts.iter().all(|t| is_iso8601(t))),
            _ => true,
        }
    }
}

/// Whether `text` is an ISO 8601 date or date-time.
///
/// Accepts RFC 3339 timestamps, timestamps without offset (with `T` or a
/// space separator, optional fractional seconds) and bare dates.
pub fn is_iso8601(text: &str) -> bool {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text).is_ok()
        || DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z").is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

impl fmt::Display for NexusDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nxdl_name())
    }
}

impl FromStr for NexusDataType {
    type Err = NexusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NX_CHAR" => Ok(NexusDataType::Char),
            "NX_FLOAT" => Ok(NexusDataType::Float),
            "NX_INT" => Ok(NexusDataType::Int),
            "NX_UINT" => Ok(NexusDataType::UInt),
            "NX_POSINT" => Ok(NexusDataType::PosInt),
            "NX_NUMBER" => Ok(NexusDataType::Number),
            "NX_BOOLEAN" => Ok(NexusDataType::Boolean),
            "NX_BINARY" => Ok(NexusDataType::Binary),
            "NX_DATE_TIME" | "ISO8601" => Ok(NexusDataType::DateTime),
            other => Err(NexusError::Schema(format!("unknown data type '{}'", other))),
        }
    }
}

impl TryFrom<String> for NexusDataType {
    type Error = NexusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NexusDataType> for String {
    fn from(data_type: NexusDataType) -> Self {
        data_type.nxdl_name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_storage() {
        assert_eq!(NexusDataType::classify(StorageType::String), NexusDataType::Char);
        assert_eq!(NexusDataType::classify(StorageType::F32), NexusDataType::Float);
        assert_eq!(NexusDataType::classify(StorageType::U16), NexusDataType::UInt);
        assert_eq!(NexusDataType::classify(StorageType::I64), NexusDataType::Int);
        assert_eq!(NexusDataType::classify(StorageType::Opaque), NexusDataType::Binary);
    }

    #[test]
    fn test_numeric_widening() {
        use Compatibility::*;

        assert_eq!(NexusDataType::Int.storage_compatibility(StorageType::U32), Compatible);
        assert_eq!(NexusDataType::UInt.storage_compatibility(StorageType::I32), Incompatible);
        assert_eq!(NexusDataType::Number.storage_compatibility(StorageType::F32), Compatible);
        assert_eq!(NexusDataType::Number.storage_compatibility(StorageType::I8), Compatible);
        assert_eq!(NexusDataType::Float.storage_compatibility(StorageType::I32), Incompatible);
        assert_eq!(NexusDataType::Boolean.storage_compatibility(StorageType::U8), Compatible);
        assert_eq!(NexusDataType::Char.storage_compatibility(StorageType::F64), Incompatible);
        assert_eq!(NexusDataType::PosInt.storage_compatibility(StorageType::I32), NeedsValues);
        assert_eq!(NexusDataType::DateTime.storage_compatibility(StorageType::F64), Incompatible);
    }

    #[test]
    fn test_iso8601() {
        assert!(is_iso8601("2024-03-01T12:30:00Z"));
        assert!(is_iso8601("2024-03-01T12:30:00+01:00"));
        assert!(is_iso8601("2024-03-01T12:30:00.125"));
        assert!(is_iso8601("2024-03-01 12:30:00"));
        assert!(is_iso8601("2024-03-01"));
        assert!(!is_iso8601("01/03/2024"));
        assert!(!is_iso8601("yesterday"));
    }

    #[test]
    fn test_values_conform() {
        assert!(NexusDataType::PosInt.values_conform(&FieldValue::Int(vec![3, 4])));
        assert!(!NexusDataType::PosInt.values_conform(&FieldValue::Int(vec![0, 4])));
        assert!(NexusDataType::DateTime
            .values_conform(&FieldValue::Text(vec!["2020-01-01T00:00:00Z".into()])));
        assert!(!NexusDataType::DateTime.values_conform(&FieldValue::Text(vec!["soon".into()])));
        assert!(NexusDataType::Float.values_conform(&FieldValue::Float(vec![1.0])));
    }

    #[test]
    fn test_parse_nxdl_names() {
        assert_eq!("ISO8601".parse::<NexusDataType>().unwrap(), NexusDataType::DateTime);
        assert_eq!("NX_POSINT".parse::<NexusDataType>().unwrap(), NexusDataType::PosInt);
        assert!("NX_COMPLEX".parse::<NexusDataType>().is_err());
    }
}
