//! Contexts and their instances.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A category of real-world entity, e.g. "patient" or "organism".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Unique name.
    pub name: String,

    /// Parameters asked as soon as an instance is created.
    #[serde(default)]
    pub initial_data: Vec<String>,

    /// Parameters the consultation is trying to determine.
    #[serde(default)]
    pub goals: Vec<String>,
}

impl Context {
    /// Creates a context without initial data or goals.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial_data: Vec::new(),
            goals: Vec::new(),
        }
    }

    /// Sets the initial-data parameters.
    #[must_use]
    pub fn with_initial_data<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_data = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the goal parameters.
    #[must_use]
    pub fn with_goals<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.goals = parameters.into_iter().map(Into::into).collect();
        self
    }
}

/// One occurrence of a context, e.g. `organism-2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Instance {
    /// Context name.
    pub context: String,

    /// Sequence number within the context, starting at 1.
    pub number: u32,
}

impl Instance {
    /// Creates an instance identifier.
    #[must_use]
    pub fn new(context: impl Into<String>, number: u32) -> Self {
        Self {
            context: context.into(),
            number,
        }
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.context, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_display() {
        assert_eq!(Instance::new("organism", 2).to_string(), "organism-2");
    }

    #[test]
    fn test_context_builder() {
        let ctx = Context::new("patient")
            .with_initial_data(["name", "sex", "age"])
            .with_goals(Vec::<String>::new());
        assert_eq!(ctx.initial_data, vec!["name", "sex", "age"]);
        assert!(ctx.goals.is_empty());
    }

    #[test]
    fn test_context_deserialize_defaults() {
        let ctx: Context = serde_json::from_str(r#"{"name": "culture"}"#).unwrap();
        assert_eq!(ctx, Context::new("culture"));
    }
}
