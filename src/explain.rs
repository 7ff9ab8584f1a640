//! Why is a parameter being sought?
//!
//! The engine threads a [`Reason`] through every resolution step. When the
//! ask collaborator needs to justify a question, the reason is turned into an
//! [`Explanation`]: either the parameter is part of the consultation's
//! initial data or goals, or a rule needs it, in which case the premises
//! already known are listed and the rule is shown reduced to the premises
//! still to be determined.

use std::fmt;

use serde::Serialize;

use crate::rule::{Premise, Rule};

/// Why a parameter is being resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reason<'r> {
    /// The parameter is initial data of a context.
    Initial,
    /// The parameter is a goal of a context (or was requested directly).
    Goal,
    /// The parameter is needed by a premise of this rule.
    Rule(&'r Rule),
}

impl<'r> Reason<'r> {
    /// The active rule, if any.
    #[must_use]
    pub const fn rule(&self) -> Option<&'r Rule> {
        match *self {
            Self::Rule(rule) => Some(rule),
            Self::Initial | Self::Goal => None,
        }
    }
}

/// A human-readable justification for a question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Explanation {
    /// One of the initial-data parameters.
    Initial {
        /// Parameter being sought.
        parameter: String,
    },

    /// One of the goal parameters.
    Goal {
        /// Parameter being sought.
        parameter: String,
    },

    /// Needed by a rule.
    Rule {
        /// Parameter being sought.
        parameter: String,
        /// Premises of the rule that already hold.
        known: Vec<Premise>,
        /// The rule restricted to the premises not yet known.
        remaining: Rule,
    },
}

impl Explanation {
    /// Parameter being sought.
    #[must_use]
    pub fn parameter(&self) -> &str {
        match self {
            Self::Initial { parameter } | Self::Goal { parameter } | Self::Rule { parameter, .. } => {
                parameter
            }
        }
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial { parameter } => {
                writeln!(f, "{parameter} is one of the initial parameters.")
            }
            Self::Goal { parameter } => writeln!(f, "{parameter} is one of the goal parameters."),
            Self::Rule {
                known, remaining, ..
            } => {
                if !known.is_empty() {
                    writeln!(f, "It is known that:")?;
                    for (i, premise) in known.iter().enumerate() {
                        writeln!(f, "    {:>2}) {premise}", i + 1)?;
                    }
                    writeln!(f, "Therefore,")?;
                }
                write!(f, "{remaining}")
            }
        }
    }
}
