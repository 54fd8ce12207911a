//! Application definitions and the registry that dispatches to them.
//!
//! A definition is anything implementing [`ApplicationValidator`]: either the
//! data-driven [`SchemaWalker`] or a hand-written call sequence such as
//! [`DirectTofValidator`].

pub mod builtin;
mod directtof;
mod walker;

use indexmap::IndexMap;

use crate::tree::NexusGroup;
use crate::validation::{CheckResult, ValidationEngine};

pub use directtof::DirectTofValidator;
pub use walker::SchemaWalker;

/// Validates one entry against one application definition.
pub trait ApplicationValidator: Send + Sync {
    /// Value of the entry's `definition` field this validator handles.
    fn definition(&self) -> &str;

    /// Walk `entry`, recording findings in `engine`.
    ///
    /// The caller has already set the entry context and pushed nothing onto
    /// the group path.
    fn validate_entry<'t>(
        &self,
        engine: &mut ValidationEngine<'t>,
        entry: &'t dyn NexusGroup,
    ) -> CheckResult<()>;
}

/// Definition name to validator.
pub struct DefinitionRegistry {
    validators: IndexMap<String, Box<dyn ApplicationValidator>>,
}

impl DefinitionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            validators: IndexMap::new(),
        }
    }

    /// A registry holding every built-in definition.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for schema in builtin::all() {
            registry.register(SchemaWalker::new(schema));
        }
        registry
    }

    /// Add a validator, replacing any previous one for the same definition.
    pub fn register(&mut self, validator: impl ApplicationValidator + 'static) {
        self.validators
            .insert(validator.definition().to_string(), Box::new(validator));
    }

    pub fn get(&self, definition: &str) -> Option<&dyn ApplicationValidator> {
        self.validators.get(definition).map(|v| v.as_ref())
    }

    /// Registered definition names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Default for DefinitionRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for DefinitionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionRegistry")
            .field("definitions", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}
