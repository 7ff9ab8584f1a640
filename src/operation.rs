//! Named binary predicates used inside rule conditions.
//!
//! Conditions refer to operations by name (`is`, `<`, ...). The registry maps
//! each name to a predicate over `(stored value, target value)`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ValidationError;

/// A binary predicate over (stored value, target value).
pub type Predicate = Arc<dyn Fn(&str, &str) -> bool + Send + Sync>;

fn numeric(stored: &str, target: &str, cmp: fn(f64, f64) -> bool) -> bool {
    match (stored.trim().parse::<f64>(), target.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => cmp(a, b),
        _ => false,
    }
}

/// Registry of operations available to conditions.
#[derive(Clone)]
pub struct OperationRegistry {
    ops: HashMap<String, Predicate>,
}

impl OperationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            ops: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in operations.
    ///
    /// `is`/`=` and `is-not`/`!=` compare strings; `<`, `>`, `<=` and `>=`
    /// compare numerically and are false when either side is not a number.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        let builtins: [(&str, Predicate); 8] = [
            ("is", Arc::new(|a: &str, b: &str| a == b)),
            ("=", Arc::new(|a: &str, b: &str| a == b)),
            ("is-not", Arc::new(|a: &str, b: &str| a != b)),
            ("!=", Arc::new(|a: &str, b: &str| a != b)),
            ("<", Arc::new(|a: &str, b: &str| numeric(a, b, |x, y| x < y))),
            (">", Arc::new(|a: &str, b: &str| numeric(a, b, |x, y| x > y))),
            ("<=", Arc::new(|a: &str, b: &str| numeric(a, b, |x, y| x <= y))),
            (">=", Arc::new(|a: &str, b: &str| numeric(a, b, |x, y| x >= y))),
        ];
        for (name, predicate) in builtins {
            registry.ops.insert(name.to_string(), predicate);
        }
        registry
    }

    /// Registers a named predicate.
    ///
    /// The predicate's type fixes its arity at two.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty name or a name already registered.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F) -> Result<(), ValidationError>
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField {
                field: "operation".to_string(),
            });
        }
        if self.ops.contains_key(trimmed) {
            return Err(ValidationError::DuplicateOperation {
                name: trimmed.to_string(),
            });
        }
        self.ops.insert(trimmed.to_string(), Arc::new(predicate));
        Ok(())
    }

    /// Looks up a predicate.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.ops.get(name)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Applies a named operation, or `None` if it is not registered.
    #[must_use]
    pub fn apply(&self, name: &str, stored: &str, target: &str) -> Option<bool> {
        self.ops.get(name).map(|op| op(stored, target))
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.ops.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("OperationRegistry").field("ops", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let ops = OperationRegistry::with_builtins();
        assert_eq!(ops.apply("is", "rod", "rod"), Some(true));
        assert_eq!(ops.apply("is-not", "rod", "rod"), Some(false));
        assert_eq!(ops.apply(">", "65", "60"), Some(true));
        assert_eq!(ops.apply("<=", "60", "60"), Some(true));
        assert_eq!(ops.apply("<", "old", "60"), Some(false));
        assert_eq!(ops.apply("matches", "a", "a"), None);
    }

    #[test]
    fn test_register_custom() {
        let mut ops = OperationRegistry::empty();
        ops.register("prefix", |a, b| a.starts_with(b)).unwrap();
        assert_eq!(ops.apply("prefix", "staphylococcus", "staph"), Some(true));
        assert!(matches!(
            ops.register("prefix", |_, _| true),
            Err(ValidationError::DuplicateOperation { .. })
        ));
        assert!(matches!(
            ops.register("  ", |_, _| true),
            Err(ValidationError::EmptyField { .. })
        ));
    }
}
