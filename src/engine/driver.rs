//! Consultation driver: instance creation and the findings report.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use tracing::info;

use super::Session;
use crate::ask::Asker;
use crate::context::Instance;
use crate::error::{EmycinResult, ValidationError};
use crate::explain::Reason;
use crate::facts::Fact;
use crate::knowledge_base::KnowledgeBase;

/// Values established for one goal parameter, strongest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalFindings {
    /// Goal parameter.
    pub parameter: String,
    /// Values with their cfs, sorted by descending cf.
    pub facts: Vec<Fact>,
}

/// Goal values established for one instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Findings {
    /// The instance reported on.
    pub instance: Instance,
    /// One entry per goal that has at least one value.
    pub goals: Vec<GoalFindings>,
}

impl Findings {
    /// Returns true if no goal has a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// Values found for `parameter`, strongest first.
    #[must_use]
    pub fn goal(&self, parameter: &str) -> Option<&[Fact]> {
        self.goals
            .iter()
            .find(|g| g.parameter == parameter)
            .map(|g| g.facts.as_slice())
    }
}

impl fmt::Display for Findings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Findings for {}:", self.instance)?;
        for goal in &self.goals {
            let values: Vec<String> = goal
                .facts
                .iter()
                .map(|fact| format!("{} ({:.2})", fact.value, fact.cf))
                .collect();
            writeln!(f, "  {}: {}", goal.parameter, values.join(", "))?;
        }
        Ok(())
    }
}

impl<A: Asker> Session<'_, A> {
    /// Runs contexts in order.
    ///
    /// For each context a new instance is created, its initial data is
    /// resolved, then its goals. Returns findings for every context that
    /// declares goals.
    ///
    /// # Errors
    ///
    /// Fails for an unregistered context or on any resolution error.
    pub fn get_context_data(&mut self, contexts: &[&str]) -> EmycinResult<Vec<Findings>> {
        let kb = self.kb;
        let mut report = Vec::new();
        for &name in contexts {
            let context = kb.context(name).ok_or_else(|| ValidationError::UnknownContext {
                name: name.to_string(),
            })?;
            let instance = self.new_instance(name)?;

            for parameter in &context.initial_data {
                self.find_out_because(parameter, &instance, Reason::Initial)?;
            }
            for parameter in &context.goals {
                self.find_out_because(parameter, &instance, Reason::Goal)?;
            }
            if !context.goals.is_empty() {
                report.push(self.findings(&context.goals, &instance));
            }
        }
        Ok(report)
    }

    /// Collects the values of `goals` for `instance`, skipping goals with none.
    #[must_use]
    pub fn findings(&self, goals: &[String], instance: &Instance) -> Findings {
        let goals = goals
            .iter()
            .filter_map(|parameter| {
                let mut facts = self.facts.values(parameter, instance).to_vec();
                if facts.is_empty() {
                    return None;
                }
                facts.sort_by(|a, b| b.cf.partial_cmp(&a.cf).unwrap_or(Ordering::Equal));
                Some(GoalFindings {
                    parameter: parameter.clone(),
                    facts,
                })
            })
            .collect();
        Findings {
            instance: instance.clone(),
            goals,
        }
    }

    /// Clears the session and runs a fresh consultation over `contexts`.
    ///
    /// # Errors
    ///
    /// See [`Self::get_context_data`].
    pub fn run(&mut self, contexts: &[&str]) -> EmycinResult<Vec<Findings>> {
        self.clear();
        info!(contexts = contexts.len(), "starting consultation");
        let report = self.get_context_data(contexts)?;
        info!(stats = ?self.stats, "consultation finished");
        Ok(report)
    }
}

/// Runs one consultation with a fresh session.
///
/// # Errors
///
/// See [`Session::get_context_data`].
pub fn emycin<A: Asker>(
    kb: &KnowledgeBase,
    asker: A,
    contexts: &[&str],
) -> EmycinResult<Vec<Findings>> {
    Session::new(kb, asker).run(contexts)
}
