//! Generic walker driven by a declarative definition.

use crate::schema::{DefinitionSchema, FieldSpec, GroupSpec};
use crate::tree::NexusGroup;
use crate::validation::{CheckResult, ValidationEngine};

use super::ApplicationValidator;

/// Validates entries against a [`DefinitionSchema`].
///
/// Fields of a group are checked before its subgroups, in declaration order,
/// which matches the call order of the generated walkers.
#[derive(Debug, Clone)]
pub struct SchemaWalker {
    schema: DefinitionSchema,
}

impl SchemaWalker {
    pub fn new(schema: DefinitionSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &DefinitionSchema {
        &self.schema
    }

    fn walk_group<'t>(
        &self,
        engine: &mut ValidationEngine<'t>,
        spec: &GroupSpec,
        parent: &'t dyn NexusGroup,
    ) -> CheckResult<()> {
        let Some(name) = spec.name.as_deref() else {
            // Identified by class only: every matching child is checked.
            let present = parent.groups_of_class(&spec.nx_class);
            if present.is_empty() && spec.recommended {
                engine.recommended_group(None, &spec.nx_class, None);
            }
            engine.unnamed_group_occurrences(parent, &spec.nx_class, spec.required, spec.multiple)?;
            for group in present {
                self.walk_group_body(engine, spec, group)?;
            }
            return Ok(());
        };

        let group = parent.group_named_or_unique(Some(name), &spec.nx_class);
        let group = if spec.required {
            engine.group_not_null(Some(name), &spec.nx_class, group)?
        } else if spec.recommended {
            engine.recommended_group(Some(name), &spec.nx_class, group)
        } else {
            group
        };
        match group {
            Some(group) => self.walk_group_body(engine, spec, group),
            None => Ok(()),
        }
    }

    fn walk_group_body<'t>(
        &self,
        engine: &mut ValidationEngine<'t>,
        spec: &GroupSpec,
        group: &'t dyn NexusGroup,
    ) -> CheckResult<()> {
        engine.in_group(group.name(), |engine| {
            let reset = spec
                .reset_dimensions
                .unwrap_or(engine.config().reset_dimensions_per_group);
            if reset {
                engine.clear_local_group_dimension_placeholder_values();
            }
            for field in &spec.fields {
                self.walk_field(engine, field, group)?;
            }
            for child in &spec.groups {
                self.walk_group(engine, child, group)?;
            }
            Ok(())
        })
    }

    fn walk_field<'t>(
        &self,
        engine: &mut ValidationEngine<'t>,
        spec: &FieldSpec,
        group: &'t dyn NexusGroup,
    ) -> CheckResult<()> {
        let name = spec.name.as_str();
        let field = group.field(name);
        let field = if spec.required {
            engine.field_not_null(name, field)?
        } else if spec.recommended {
            engine.recommended_field(name, field)
        } else {
            field
        };
        let Some(field) = field else {
            return Ok(());
        };

        if let Some(data_type) = spec.data_type {
            engine.field_type(name, field, data_type)?;
        }
        if let Some(units) = spec.units {
            engine.field_units(name, field, units)?;
        }
        if !spec.enumeration.is_empty() {
            engine.field_enumeration(name, field, spec.enumeration.as_slice())?;
        }
        if !spec.dimensions.is_empty() {
            engine.field_dimensions(name, field, &spec.dimensions)?;
        } else if let Some(rank) = spec.rank {
            engine.field_rank(name, field, rank)?;
        }
        if let Some(target) = spec.link_target.as_deref() {
            engine.field_link_target(name, field, target)?;
        }
        Ok(())
    }
}

impl ApplicationValidator for SchemaWalker {
    fn definition(&self) -> &str {
        &self.schema.name
    }

    fn validate_entry<'t>(
        &self,
        engine: &mut ValidationEngine<'t>,
        entry: &'t dyn NexusGroup,
    ) -> CheckResult<()> {
        self.walk_group_body(engine, &self.schema.entry, entry)
    }
}
