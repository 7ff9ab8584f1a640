//! The knowledge base: parameters, contexts, operations and rules.
//!
//! Everything here is built during setup and read-only while a session runs.
//! Rules are indexed by every distinct parameter named in their conclusions,
//! so a rule concluding two parameters sits in two index buckets.

use std::borrow::Cow;
use std::collections::HashMap;

use tracing::debug;

use crate::context::Context;
use crate::error::{EmycinResult, ValidationError};
use crate::operation::OperationRegistry;
use crate::parameter::Parameter;
use crate::rule::{Condition, Rule};

fn require_name(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Parameters, contexts, operations and rules of one domain.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    parameters: HashMap<String, Parameter>,
    contexts: Vec<Context>,
    operations: OperationRegistry,
    rules: Vec<Rule>,
    index: HashMap<String, Vec<usize>>,
}

impl KnowledgeBase {
    /// Creates an empty knowledge base with the built-in operations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a parameter.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty name or a malformed acceptance capability.
    pub fn register_parameter(&mut self, parameter: Parameter) -> Result<(), ValidationError> {
        require_name(&parameter.name, "parameter")?;
        parameter
            .acceptance
            .check()
            .map_err(|reason| ValidationError::MalformedAcceptance {
                parameter: parameter.name.clone(),
                reason,
            })?;
        debug!(parameter = %parameter.name, context = %parameter.context, "registered parameter");
        self.parameters.insert(parameter.name.clone(), parameter);
        Ok(())
    }

    /// Registers (or replaces) a context.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty name.
    pub fn register_context(&mut self, context: Context) -> Result<(), ValidationError> {
        require_name(&context.name, "context")?;
        if let Some(existing) = self.contexts.iter_mut().find(|c| c.name == context.name) {
            *existing = context;
        } else {
            self.contexts.push(context);
        }
        Ok(())
    }

    /// Registers a named binary predicate.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or duplicate name.
    pub fn register_operation<F>(&mut self, name: impl Into<String>, predicate: F) -> Result<(), ValidationError>
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.operations.register(name, predicate)
    }

    /// Registers a rule and indexes it by its concluded parameters.
    ///
    /// # Errors
    ///
    /// Returns an error for an out-of-range cf, a rule without conclusions,
    /// an invalid premise or conclusion, or a duplicate rule number.
    pub fn register_rule(&mut self, rule: Rule) -> Result<(), ValidationError> {
        crate::confidence::validate_cf(rule.cf)?;
        if rule.conclusions.is_empty() {
            return Err(ValidationError::EmptyField {
                field: format!("rule {} conclusions", rule.number),
            });
        }
        for condition in rule.premises.iter().chain(&rule.conclusions) {
            self.check_condition(condition)?;
        }
        if self.rules.iter().any(|r| r.number == rule.number) {
            return Err(ValidationError::DuplicateRule {
                number: rule.number,
            });
        }

        let slot = self.rules.len();
        for parameter in rule.concluded_parameters() {
            self.index.entry(parameter.to_string()).or_default().push(slot);
        }
        debug!(rule = rule.number, premises = rule.premises.len(), "registered rule");
        self.rules.push(rule);
        Ok(())
    }

    /// Rules that can conclude `parameter`, in registration order.
    #[must_use]
    pub fn rules_for(&self, parameter: &str) -> Vec<&Rule> {
        self.index
            .get(parameter)
            .map(|slots| slots.iter().map(|&i| &self.rules[i]).collect())
            .unwrap_or_default()
    }

    /// Looks up a rule by number.
    #[must_use]
    pub fn rule(&self, number: u32) -> Option<&Rule> {
        self.rules.iter().find(|r| r.number == number)
    }

    /// All rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Strict parameter lookup.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Parameter metadata, or a bare default for an unregistered name.
    ///
    /// The default is not inserted; use [`Self::get_or_create_parameter`]
    /// during setup when the default should be kept.
    #[must_use]
    pub fn parameter_or_default(&self, name: &str) -> Cow<'_, Parameter> {
        self.parameters
            .get(name)
            .map_or_else(|| Cow::Owned(Parameter::bare(name)), Cow::Borrowed)
    }

    /// Parameter metadata, inserting a bare default on a miss.
    pub fn get_or_create_parameter(&mut self, name: &str) -> &Parameter {
        self.parameters
            .entry(name.to_string())
            .or_insert_with(|| Parameter::bare(name))
    }

    /// Looks up a context.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// All contexts in registration order.
    #[must_use]
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// The operation registry.
    #[must_use]
    pub const fn operations(&self) -> &OperationRegistry {
        &self.operations
    }

    /// Builds a validated condition.
    ///
    /// # Errors
    ///
    /// Fails if the parameter is not registered, belongs to another context,
    /// the operation is unknown, or the value is not accepted.
    pub fn condition(
        &self,
        parameter: impl Into<String>,
        context: impl Into<String>,
        operation: impl Into<String>,
        value: impl Into<String>,
    ) -> EmycinResult<Condition> {
        let condition = Condition {
            parameter: parameter.into(),
            context: context.into(),
            operation: operation.into(),
            value: value.into(),
        };
        self.check_condition(&condition)?;
        Ok(condition)
    }

    fn check_condition(&self, condition: &Condition) -> Result<(), ValidationError> {
        let parm = self.parameters.get(&condition.parameter).ok_or_else(|| {
            ValidationError::UnknownParameter {
                name: condition.parameter.clone(),
            }
        })?;
        if parm.context != condition.context {
            return Err(ValidationError::ContextMismatch {
                parameter: condition.parameter.clone(),
                expected: parm.context.clone(),
                actual: condition.context.clone(),
            });
        }
        if !self.operations.contains(&condition.operation) {
            return Err(ValidationError::UnknownOperation {
                name: condition.operation.clone(),
            });
        }
        if !parm.accepts(&condition.value) {
            return Err(ValidationError::ValueNotAccepted {
                parameter: condition.parameter.clone(),
                value: condition.value.clone(),
                help: parm.acceptance.help(),
            });
        }
        Ok(())
    }

    /// Removes all parameters, contexts and rules; keeps operations.
    pub fn clear(&mut self) {
        self.parameters.clear();
        self.contexts.clear();
        self.rules.clear();
        self.index.clear();
    }
}
