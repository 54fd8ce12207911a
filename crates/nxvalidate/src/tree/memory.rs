//! In-memory NeXus tree.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{NexusError, Result};

use super::{FieldValue, NexusField, NexusGroup, StorageType};

type Loader = Arc<dyn Fn() -> std::result::Result<FieldValue, String> + Send + Sync>;

#[derive(Clone)]
enum ValueSource {
    Eager(FieldValue),
    Lazy(Loader),
}

/// A field held in memory, either materialized or behind a loader closure.
#[derive(Clone)]
pub struct MemoryField {
    name: String,
    storage: StorageType,
    shape: Vec<usize>,
    units: Option<String>,
    link_target: Option<String>,
    source: ValueSource,
}

impl MemoryField {
    /// Create a field with an explicit storage type and shape.
    pub fn new(
        name: impl Into<String>,
        storage: StorageType,
        shape: Vec<usize>,
        value: FieldValue,
    ) -> Self {
        Self {
            name: name.into(),
            storage,
            shape,
            units: None,
            link_target: None,
            source: ValueSource::Eager(value),
        }
    }

    /// Create a field whose value is produced on first access.
    pub fn lazy<F>(
        name: impl Into<String>,
        storage: StorageType,
        shape: Vec<usize>,
        loader: F,
    ) -> Self
    where
        F: Fn() -> std::result::Result<FieldValue, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            storage,
            shape,
            units: None,
            link_target: None,
            source: ValueSource::Lazy(Arc::new(loader)),
        }
    }

    /// Scalar string field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, StorageType::String, Vec::new(), FieldValue::Text(vec![value.into()]))
    }

    /// Scalar float64 field.
    pub fn float(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, StorageType::F64, Vec::new(), FieldValue::Float(vec![value]))
    }

    /// Scalar int64 field.
    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, StorageType::I64, Vec::new(), FieldValue::Int(vec![value]))
    }

    /// One-dimensional float64 field.
    pub fn floats(name: impl Into<String>, values: Vec<f64>) -> Self {
        let shape = vec![values.len()];
        Self::new(name, StorageType::F64, shape, FieldValue::Float(values))
    }

    /// One-dimensional int32 field.
    pub fn ints(name: impl Into<String>, values: Vec<i64>) -> Self {
        let shape = vec![values.len()];
        Self::new(name, StorageType::I32, shape, FieldValue::Int(values))
    }

    /// Zero-filled float64 field of the given shape.
    pub fn float_array(name: impl Into<String>, shape: Vec<usize>) -> Self {
        let count = shape.iter().product();
        Self::new(name, StorageType::F64, shape, FieldValue::Float(vec![0.0; count]))
    }

    /// Zero-filled int32 field of the given shape.
    pub fn int_array(name: impl Into<String>, shape: Vec<usize>) -> Self {
        let count = shape.iter().product();
        Self::new(name, StorageType::I32, shape, FieldValue::Int(vec![0; count]))
    }

    /// Set the `units` attribute.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Mark the field as a link to `target`.
    pub fn with_link_target(mut self, target: impl Into<String>) -> Self {
        self.link_target = Some(target.into());
        self
    }

    /// Override the storage type, keeping the value.
    pub fn with_storage(mut self, storage: StorageType) -> Self {
        self.storage = storage;
        self
    }
}

impl fmt::Debug for MemoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            ValueSource::Eager(v) => format!("{:?}", v),
            ValueSource::Lazy(_) => "<lazy>".to_string(),
        };
        f.debug_struct("MemoryField")
            .field("name", &self.name)
            .field("storage", &self.storage)
            .field("shape", &self.shape)
            .field("units", &self.units)
            .field("link_target", &self.link_target)
            .field("source", &source)
            .finish()
    }
}

impl NexusField for MemoryField {
    fn name(&self) -> &str {
        &self.name
    }

    fn storage_type(&self) -> StorageType {
        self.storage
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    fn load(&self) -> Result<FieldValue> {
        match &self.source {
            ValueSource::Eager(value) => Ok(value.clone()),
            ValueSource::Lazy(loader) => loader().map_err(|message| NexusError::Load {
                path: self.name.clone(),
                message,
            }),
        }
    }

    fn link_target(&self) -> Option<&str> {
        self.link_target.as_deref()
    }
}

/// A group held in memory. Children keep insertion order.
#[derive(Debug, Clone)]
pub struct MemoryGroup {
    name: String,
    nx_class: String,
    groups: IndexMap<String, MemoryGroup>,
    fields: IndexMap<String, MemoryField>,
}

impl MemoryGroup {
    pub fn new(name: impl Into<String>, nx_class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nx_class: nx_class.into(),
            groups: IndexMap::new(),
            fields: IndexMap::new(),
        }
    }

    /// Change the NeXus class, e.g. to turn an entry into a subentry.
    pub fn with_class(mut self, nx_class: impl Into<String>) -> Self {
        self.nx_class = nx_class.into();
        self
    }

    /// Add a child group (builder style).
    pub fn with_group(mut self, group: MemoryGroup) -> Self {
        self.add_group(group);
        self
    }

    /// Add a child field (builder style).
    pub fn with_field(mut self, field: MemoryField) -> Self {
        self.add_field(field);
        self
    }

    /// Add or replace a child group.
    pub fn add_group(&mut self, group: MemoryGroup) {
        self.groups.insert(group.name.clone(), group);
    }

    /// Add or replace a child field.
    pub fn add_field(&mut self, field: MemoryField) {
        self.fields.insert(field.name.clone(), field);
    }

    pub fn remove_group(&mut self, name: &str) -> Option<MemoryGroup> {
        self.groups.shift_remove(name)
    }

    pub fn remove_field(&mut self, name: &str) -> Option<MemoryField> {
        self.fields.shift_remove(name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut MemoryGroup> {
        self.groups.get_mut(name)
    }

    /// Mutable access to a descendant group by slash-separated relative path.
    pub fn descendant_mut(&mut self, path: &str) -> Option<&mut MemoryGroup> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |group, segment| group.groups.get_mut(segment))
    }
}

impl NexusGroup for MemoryGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn nx_class(&self) -> &str {
        &self.nx_class
    }

    fn group(&self, name: &str) -> Option<&dyn NexusGroup> {
        self.groups.get(name).map(|g| g as &dyn NexusGroup)
    }

    fn field(&self, name: &str) -> Option<&dyn NexusField> {
        self.fields.get(name).map(|f| f as &dyn NexusField)
    }

    fn groups(&self) -> Vec<&dyn NexusGroup> {
        self.groups.values().map(|g| g as &dyn NexusGroup).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_field_load_failure() {
        let field = MemoryField::lazy("data", StorageType::I32, vec![4], || {
            Err("dataset chunk unreadable".to_string())
        });

        let err = field.load().unwrap_err();
        assert!(matches!(err, NexusError::Load { ref path, .. } if path == "data"));
    }

    #[test]
    fn test_lazy_field_load_success() {
        let field = MemoryField::lazy("data", StorageType::I32, vec![2], || {
            Ok(FieldValue::Int(vec![1, 2]))
        });

        assert_eq!(field.load().unwrap(), FieldValue::Int(vec![1, 2]));
    }

    #[test]
    fn test_descendant_mut() {
        let mut root = MemoryGroup::new("", "NXroot").with_group(
            MemoryGroup::new("entry", "NXentry")
                .with_group(MemoryGroup::new("instrument", "NXinstrument")),
        );

        let instrument = root.descendant_mut("entry/instrument").unwrap();
        instrument.add_field(MemoryField::text("name", "LET"));

        let entry = root.group("entry").unwrap();
        let instrument = entry.group("instrument").unwrap();
        assert!(instrument.field("name").is_some());
    }

    #[test]
    fn test_scalar_field_shape() {
        let field = MemoryField::float("energy", 3.5).with_units("meV");
        assert_eq!(field.rank(), 0);
        assert_eq!(field.element_count(), 1);
        assert_eq!(field.units(), Some("meV"));
    }
}
