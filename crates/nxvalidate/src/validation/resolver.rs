//! Dimension placeholder resolution.

use std::fmt;

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    length: usize,
    bound_by: String,
}

/// A symbol referenced with a length different from the one it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub symbol: String,
    pub bound: usize,
    pub bound_by: String,
    pub observed: usize,
}

impl fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is {} here but was bound to {} by '{}'",
            self.symbol, self.observed, self.bound, self.bound_by
        )
    }
}

/// Symbol table for one group scope.
///
/// The first field to reference a symbol binds it; later references in the
/// same scope must agree. Only [`DimensionTable::clear`] resets bindings.
#[derive(Debug, Clone, Default)]
pub struct DimensionTable {
    bindings: IndexMap<String, Binding>,
}

impl DimensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every binding.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Bind `symbol` to `observed`, or check it against the existing binding.
    ///
    /// `field` names the referencing field and is kept for mismatch messages.
    /// A mismatch leaves the original binding in place.
    pub fn resolve(
        &mut self,
        symbol: &str,
        observed: usize,
        field: &str,
    ) -> Result<usize, DimensionMismatch> {
        match self.bindings.get(symbol) {
            Some(binding) if binding.length == observed => Ok(observed),
            Some(binding) => Err(DimensionMismatch {
                symbol: symbol.to_string(),
                bound: binding.length,
                bound_by: binding.bound_by.clone(),
                observed,
            }),
            None => {
                self.bindings.insert(
                    symbol.to_string(),
                    Binding {
                        length: observed,
                        bound_by: field.to_string(),
                    },
                );
                Ok(observed)
            }
        }
    }

    /// Current length bound to `symbol`.
    pub fn get(&self, symbol: &str) -> Option<usize> {
        self.bindings.get(symbol).map(|b| b.length)
    }

    /// Bound symbols in binding order.
    pub fn symbols(&self) -> impl Iterator<Item = (&str, usize)> {
        self.bindings.iter().map(|(k, b)| (k.as_str(), b.length))
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
