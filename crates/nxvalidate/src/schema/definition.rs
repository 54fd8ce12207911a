//! Declarative application definitions.
//!
//! A [`DefinitionSchema`] expresses the tree shape an NXDL application
//! definition requires as plain data, so one generic walker can validate any
//! definition instead of one generated walker per definition.

use serde::{Deserialize, Serialize};

use crate::error::{NexusError, Result};

use super::dims::Dim;
use super::types::NexusDataType;
use super::units::UnitCategory;

fn yes() -> bool {
    true
}

/// Constraints on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default = "yes")]
    pub required: bool,
    /// Absence is a warning rather than an error. Only meaningful when not required.
    #[serde(default)]
    pub recommended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<NexusDataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<UnitCategory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<String>,
    /// Checked only when `dimensions` is empty; dimensions imply the rank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Dim>,
    /// NXDL link target, e.g. `/NXentry/NXinstrument/NXdetector/data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
}

impl FieldSpec {
    /// A required field with no further constraints.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            recommended: false,
            data_type: None,
            units: None,
            enumeration: Vec::new(),
            rank: None,
            dimensions: Vec::new(),
            link_target: None,
        }
    }

    pub fn of_type(mut self, data_type: NexusDataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn units(mut self, category: UnitCategory) -> Self {
        self.units = Some(category);
        self
    }

    pub fn enumeration<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumeration = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn rank(mut self, rank: usize) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn dims(mut self, dims: Vec<Dim>) -> Self {
        self.dimensions = dims;
        self
    }

    pub fn link(mut self, target: impl Into<String>) -> Self {
        self.link_target = Some(target.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn recommended(mut self) -> Self {
        self.required = false;
        self.recommended = true;
        self
    }
}

/// Constraints on one group and its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Fixed name, or `None` when the group is identified by class only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub nx_class: String,
    #[serde(default = "yes")]
    pub required: bool,
    /// Whether more than one group of this class may appear. Unnamed groups only.
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub recommended: bool,
    /// Whether entering this group clears dimension symbols. `None` defers to
    /// the run configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_dimensions: Option<bool>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

impl GroupSpec {
    /// A required group with a fixed name.
    pub fn named(name: impl Into<String>, nx_class: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::unnamed(nx_class)
        }
    }

    /// A required group identified by class.
    pub fn unnamed(nx_class: impl Into<String>) -> Self {
        Self {
            name: None,
            nx_class: nx_class.into(),
            required: true,
            multiple: false,
            recommended: false,
            reset_dimensions: None,
            fields: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn recommended(mut self) -> Self {
        self.required = false;
        self.recommended = true;
        self
    }

    pub fn reset_dimensions(mut self, reset: bool) -> Self {
        self.reset_dimensions = Some(reset);
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    /// Label used in messages: the name, or the class for unnamed groups.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.nx_class)
    }

    fn check(&self, path: &str) -> Result<()> {
        let path = format!("{}/{}", path, self.label());
        if !self.nx_class.starts_with("NX") {
            return Err(NexusError::Schema(format!(
                "{}: '{}' is not a NeXus class",
                path, self.nx_class
            )));
        }
        if self.multiple && self.name.is_some() {
            return Err(NexusError::Schema(format!(
                "{}: only unnamed groups may repeat",
                path
            )));
        }
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(NexusError::Schema(format!("{}: field with empty name", path)));
            }
            if let Some(rank) = field.rank {
                if !field.dimensions.is_empty() && field.dimensions.len() != rank {
                    return Err(NexusError::Schema(format!(
                        "{}/{}: rank {} disagrees with {} dimensions",
                        path,
                        field.name,
                        rank,
                        field.dimensions.len()
                    )));
                }
            }
        }
        self.groups.iter().try_for_each(|g| g.check(&path))
    }
}

/// A complete application definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionSchema {
    /// Value the entry's `definition` field must hold, e.g. `NXlauetof`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Constraints on the entry (`NXentry` or `NXsubentry`) group.
    pub entry: GroupSpec,
}

impl DefinitionSchema {
    pub fn new(name: impl Into<String>, entry: GroupSpec) -> Self {
        Self {
            name: name.into(),
            description: None,
            entry,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Load and check a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: DefinitionSchema = serde_json::from_str(json)?;
        schema.check()?;
        Ok(schema)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural sanity checks on the definition itself.
    pub fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(NexusError::Schema("definition name is empty".to_string()));
        }
        if !matches!(self.entry.nx_class.as_str(), "NXentry" | "NXsubentry") {
            return Err(NexusError::Schema(format!(
                "{}: entry must be NXentry or NXsubentry, not {}",
                self.name, self.entry.nx_class
            )));
        }
        self.entry.check("")
    }
}
