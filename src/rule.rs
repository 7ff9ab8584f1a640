//! Rules: a conjunction of premises implying a list of conclusions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::confidence::{describe, validate_cf};
use crate::error::{EmycinResult, ValidationError};
use crate::knowledge_base::KnowledgeBase;

/// A test or an assertion on one parameter of one context.
///
/// Build validated conditions through [`KnowledgeBase::condition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Parameter name.
    pub parameter: String,
    /// Context the parameter belongs to.
    pub context: String,
    /// Operation name.
    pub operation: String,
    /// Target value.
    pub value: String,
}

/// A condition tested by a rule.
pub type Premise = Condition;

/// A condition asserted when a rule fires.
pub type Conclusion = Condition;

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "the {} of the {} {} {}",
            self.parameter, self.context, self.operation, self.value
        )
    }
}

/// An if-then rule with its own certainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule number.
    pub number: u32,
    /// Conjunction of premises, evaluated left to right.
    pub premises: Vec<Premise>,
    /// Conclusions asserted when the premises hold.
    pub conclusions: Vec<Conclusion>,
    /// Strength of the rule itself.
    pub cf: f64,
}

impl Rule {
    /// Starts building a rule.
    #[must_use]
    pub fn builder(number: u32) -> RuleBuilder {
        RuleBuilder::new(number)
    }

    /// Distinct parameters named in the conclusions, in order.
    #[must_use]
    pub fn concluded_parameters(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.conclusions.len());
        for c in &self.conclusions {
            if !out.contains(&c.parameter.as_str()) {
                out.push(&c.parameter);
            }
        }
        out
    }

    /// Copy of this rule keeping only the given premises.
    #[must_use]
    pub fn with_premises(&self, premises: Vec<Premise>) -> Self {
        Self {
            number: self.number,
            premises,
            conclusions: self.conclusions.clone(),
            cf: self.cf,
        }
    }
}

fn write_conditions(f: &mut fmt::Formatter<'_>, conditions: &[Condition]) -> fmt::Result {
    for (i, c) in conditions.iter().enumerate() {
        writeln!(f, "    {:>2}) {c}", i + 1)?;
    }
    Ok(())
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rule {}:", self.number)?;
        if !self.premises.is_empty() {
            writeln!(f, "  If")?;
            write_conditions(f, &self.premises)?;
        }
        writeln!(f, "  Then {} ({}) that", describe(self.cf), self.cf)?;
        write_conditions(f, &self.conclusions)
    }
}

type RawCondition = (String, String, String, String);

/// Builder for [`Rule`], validated against a knowledge base.
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    number: u32,
    premises: Vec<RawCondition>,
    conclusions: Vec<RawCondition>,
    cf: f64,
}

impl RuleBuilder {
    /// Creates a builder for rule `number` with cf 1.0.
    #[must_use]
    pub fn new(number: u32) -> Self {
        Self {
            number,
            premises: Vec::new(),
            conclusions: Vec::new(),
            cf: 1.0,
        }
    }

    /// Adds a premise.
    #[must_use]
    pub fn premise(
        mut self,
        parameter: impl Into<String>,
        context: impl Into<String>,
        operation: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.premises
            .push((parameter.into(), context.into(), operation.into(), value.into()));
        self
    }

    /// Adds a conclusion.
    #[must_use]
    pub fn conclusion(
        mut self,
        parameter: impl Into<String>,
        context: impl Into<String>,
        operation: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.conclusions
            .push((parameter.into(), context.into(), operation.into(), value.into()));
        self
    }

    /// Sets the rule's cf.
    #[must_use]
    pub const fn cf(mut self, cf: f64) -> Self {
        self.cf = cf;
        self
    }

    /// Validates every condition and the cf.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-range cf, a rule without
    /// conclusions, or any invalid condition.
    pub fn build(self, kb: &KnowledgeBase) -> EmycinResult<Rule> {
        let cf = validate_cf(self.cf)?;
        if self.conclusions.is_empty() {
            return Err(ValidationError::EmptyField {
                field: format!("rule {} conclusions", self.number),
            }
            .into());
        }

        let convert = |raw: Vec<RawCondition>| -> EmycinResult<Vec<Condition>> {
            raw.into_iter()
                .map(|(p, c, o, v)| kb.condition(p, c, o, v))
                .collect()
        };

        Ok(Rule {
            number: self.number,
            premises: convert(self.premises)?,
            conclusions: convert(self.conclusions)?,
            cf,
        })
    }
}
