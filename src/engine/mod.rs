//! The inference engine.
//!
//! A [`Session`] owns everything that changes during a consultation: the fact
//! store, the resolution cache, the current instance of each context and the
//! ask collaborator. The knowledge base is borrowed read-only.
//!
//! Resolution is an ordinary mutually recursive procedure:
//!
//! ```text
//! find_out -> use_rules -> use_rule -> satisfy_premises -> eval_condition -> find_out
//! ```
//!
//! Each (parameter, instance) key is resolved at most once; the outcome is
//! kept in the known-cache, and a key that is re-entered while still being
//! resolved counts as not found. The active rule is passed down explicitly
//! as a [`Reason`] so the ask collaborator can be told why it is asked.

mod driver;

pub use driver::{emycin, Findings, GoalFindings};

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::ask::{Answer, Asker, Query};
use crate::cache::ResolutionCache;
use crate::config::EngineConfig;
use crate::confidence::{combine_and, is_false, is_true, is_valid_cf, FALSE, TRUE, UNKNOWN};
use crate::context::Instance;
use crate::error::{EmycinError, EmycinResult, ExecutionError, ValidationError};
use crate::explain::{Explanation, Reason};
use crate::facts::{FactKey, FactStore};
use crate::knowledge_base::KnowledgeBase;
use crate::parameter::Parameter;
use crate::rule::{Conclusion, Premise, Rule};

/// Counters describing the work a session has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Calls to `use_rule`.
    pub rules_applied: usize,
    /// Questions put to the ask collaborator (retries excluded).
    pub questions_asked: usize,
    /// `find_out` calls answered from the known-cache.
    pub cache_hits: usize,
}

/// State of one consultation over a knowledge base.
#[derive(Debug)]
pub struct Session<'kb, A> {
    kb: &'kb KnowledgeBase,
    asker: A,
    config: EngineConfig,
    facts: FactStore,
    cache: ResolutionCache,
    current: HashMap<String, Instance>,
    counters: HashMap<String, u32>,
    depth: usize,
    stats: SessionStats,
}

impl<'kb, A: Asker> Session<'kb, A> {
    /// Creates a session with the default configuration.
    pub fn new(kb: &'kb KnowledgeBase, asker: A) -> Self {
        Self::with_config(kb, asker, EngineConfig::default())
    }

    /// Creates a session with an explicit configuration.
    pub fn with_config(kb: &'kb KnowledgeBase, asker: A, config: EngineConfig) -> Self {
        Self {
            kb,
            asker,
            config,
            facts: FactStore::new(),
            cache: ResolutionCache::new(),
            current: HashMap::new(),
            counters: HashMap::new(),
            depth: 0,
            stats: SessionStats::default(),
        }
    }

    /// The knowledge base.
    #[must_use]
    pub const fn knowledge_base(&self) -> &'kb KnowledgeBase {
        self.kb
    }

    /// The fact store.
    #[must_use]
    pub const fn facts(&self) -> &FactStore {
        &self.facts
    }

    /// Mutable access to the fact store, e.g. to seed known facts.
    pub fn facts_mut(&mut self) -> &mut FactStore {
        &mut self.facts
    }

    /// The resolution cache.
    #[must_use]
    pub const fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// The ask collaborator.
    #[must_use]
    pub const fn asker(&self) -> &A {
        &self.asker
    }

    /// Mutable access to the ask collaborator.
    pub fn asker_mut(&mut self) -> &mut A {
        &mut self.asker
    }

    /// Work counters.
    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creates the next instance of a registered context and makes it current.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownContext` if the context is not registered.
    pub fn new_instance(&mut self, context: &str) -> EmycinResult<Instance> {
        if self.kb.context(context).is_none() {
            return Err(ValidationError::UnknownContext {
                name: context.to_string(),
            }
            .into());
        }
        let counter = self.counters.entry(context.to_string()).or_insert(0);
        *counter += 1;
        let instance = Instance::new(context, *counter);
        info!(%instance, "new instance");
        self.current.insert(context.to_string(), instance.clone());
        Ok(instance)
    }

    /// The current instance of a context.
    #[must_use]
    pub fn current_instance(&self, context: &str) -> Option<&Instance> {
        self.current.get(context)
    }

    fn instance_for(&self, context: &str) -> Result<&Instance, ExecutionError> {
        self.current
            .get(context)
            .ok_or_else(|| ExecutionError::NoCurrentInstance {
                context: context.to_string(),
            })
    }

    /// Discards facts, cache, instances and counters.
    pub fn clear(&mut self) {
        self.facts.clear();
        self.cache.clear();
        self.current.clear();
        self.counters.clear();
        self.depth = 0;
        self.stats = SessionStats::default();
    }

    /// Resolves `parameter` for `instance` as a goal.
    ///
    /// Returns true if some value was established. Only the first call for a
    /// key does any work; later calls return the cached outcome.
    ///
    /// # Errors
    ///
    /// Propagates combination errors, ask collaborator failures and
    /// `ExecutionError::CyclicDependency` when the depth limit is hit.
    pub fn find_out(&mut self, parameter: &str, instance: &Instance) -> EmycinResult<bool> {
        self.find_out_because(parameter, instance, Reason::Goal)
    }

    /// Resolves `parameter` for `instance`, recording why it is sought.
    ///
    /// # Errors
    ///
    /// See [`Self::find_out`].
    pub fn find_out_because(
        &mut self,
        parameter: &str,
        instance: &Instance,
        reason: Reason<'_>,
    ) -> EmycinResult<bool> {
        let key = FactKey::new(parameter, instance);
        if let Some(known) = self.cache.known(&key) {
            self.stats.cache_hits += 1;
            trace!(parameter, %instance, known, "known-cache hit");
            return Ok(known);
        }
        if !self.cache.begin(&key) {
            trace!(parameter, %instance, "already being resolved");
            return Ok(false);
        }
        if self.depth >= self.config.max_depth {
            self.cache.abandon(&key);
            return Err(ExecutionError::CyclicDependency {
                parameter: parameter.to_string(),
                instance: instance.to_string(),
                depth: self.depth,
            }
            .into());
        }

        self.depth += 1;
        let outcome = self.resolve(parameter, instance, reason);
        self.depth -= 1;

        match outcome {
            Ok(found) => {
                debug!(parameter, %instance, found, "resolved");
                Ok(self.cache.record(&key, found))
            }
            Err(e) => {
                self.cache.abandon(&key);
                Err(e)
            }
        }
    }

    fn resolve(&mut self, name: &str, instance: &Instance, reason: Reason<'_>) -> EmycinResult<bool> {
        let kb = self.kb;
        let parameter = kb.parameter_or_default(name);
        if parameter.ask_first {
            Ok(self.ask_vals(&parameter, instance, reason)? || self.use_rules(name)?)
        } else {
            Ok(self.use_rules(name)? || self.ask_vals(&parameter, instance, reason)?)
        }
    }

    /// Applies every rule that can conclude `parameter`.
    ///
    /// All rules are applied even after one succeeds, so each contributes
    /// its evidence. Returns true if any rule produced a true cf.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::use_rule`].
    pub fn use_rules(&mut self, parameter: &str) -> EmycinResult<bool> {
        let kb = self.kb;
        let mut any = false;
        for rule in kb.rules_for(parameter) {
            any |= is_true(self.use_rule(rule)?);
        }
        Ok(any)
    }

    /// Tries one rule.
    ///
    /// A rule with a premise already known to be false is rejected without
    /// any further search and yields [`UNKNOWN`]. Otherwise the premises are
    /// evaluated; if their combined cf is true every conclusion is asserted
    /// with `cf * rule.cf`. Returns the combined premise cf.
    ///
    /// # Errors
    ///
    /// Propagates resolution and fact store errors.
    pub fn use_rule(&mut self, rule: &Rule) -> EmycinResult<f64> {
        self.stats.rules_applied += 1;

        for premise in &rule.premises {
            if self.reject_premise(premise)? {
                debug!(rule = rule.number, %premise, "rule rejected");
                return Ok(UNKNOWN);
            }
        }

        let cf = self.satisfy_premises(&rule.premises, TRUE, Reason::Rule(rule))?;
        if is_true(cf) {
            let concluded = cf * rule.cf;
            debug!(rule = rule.number, cf, concluded, "rule fired");
            for conclusion in &rule.conclusions {
                self.conclude(conclusion, concluded)?;
            }
        }
        Ok(cf)
    }

    /// Conjoins premises left to right starting from `running_cf`.
    ///
    /// Once the running cf is no longer true the result is [`FALSE`] and the
    /// remaining premises are not evaluated, even if the running cf was only
    /// ambiguous.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::eval_condition`].
    pub fn satisfy_premises(
        &mut self,
        premises: &[Premise],
        running_cf: f64,
        reason: Reason<'_>,
    ) -> EmycinResult<f64> {
        let Some((first, rest)) = premises.split_first() else {
            return Ok(running_cf);
        };
        if !is_true(running_cf) {
            return Ok(FALSE);
        }
        let cf = self.eval_condition(first, reason, true)?;
        self.satisfy_premises(rest, combine_and(running_cf, cf), reason)
    }

    /// Evaluates a premise against the current instance of its context.
    ///
    /// With `trigger_search` the premise's parameter is resolved first.
    /// The result is the sum of the cfs of every recorded value satisfying
    /// the premise's operation; it is not clamped.
    ///
    /// # Errors
    ///
    /// Fails when the premise's context has no current instance, or on any
    /// error raised by the search.
    pub fn eval_condition(
        &mut self,
        premise: &Premise,
        reason: Reason<'_>,
        trigger_search: bool,
    ) -> EmycinResult<f64> {
        if trigger_search {
            let instance = self.instance_for(&premise.context)?.clone();
            self.find_out_because(&premise.parameter, &instance, reason)?;
        }
        self.known_cf(premise)
    }

    /// Evaluates a premise from recorded facts only.
    ///
    /// # Errors
    ///
    /// Fails when the premise's context has no current instance.
    pub fn known_cf(&self, premise: &Premise) -> EmycinResult<f64> {
        let instance = self.instance_for(&premise.context)?;
        let ops = self.kb.operations();
        let mut total = UNKNOWN;
        for fact in self.facts.values(&premise.parameter, instance) {
            match ops.apply(&premise.operation, &fact.value, &premise.value) {
                Some(true) => total += fact.cf,
                Some(false) => {}
                None => {
                    return Err(EmycinError::internal(format!(
                        "operation '{}' is not registered",
                        premise.operation
                    )))
                }
            }
        }
        if !is_valid_cf(total) {
            debug!(%premise, %instance, total, "summed cf outside [-1, 1]");
        }
        Ok(total)
    }

    /// True if the premise is already known to be false. Never searches.
    ///
    /// # Errors
    ///
    /// Fails when the premise's context has no current instance.
    pub fn reject_premise(&self, premise: &Premise) -> EmycinResult<bool> {
        Ok(is_false(self.known_cf(premise)?))
    }

    /// Asserts a conclusion for the current instance of its context.
    ///
    /// # Errors
    ///
    /// Fails on an undefined combination or a missing current instance.
    pub fn conclude(&mut self, conclusion: &Conclusion, cf: f64) -> EmycinResult<()> {
        let instance = self.instance_for(&conclusion.context)?.clone();
        let stored = self
            .facts
            .update(&conclusion.parameter, &instance, &conclusion.value, cf)?;
        debug!(%conclusion, %instance, cf, stored, "concluded");
        Ok(())
    }

    /// Builds the explanation for seeking `parameter` for `reason`.
    ///
    /// Premises are partitioned using recorded facts only, so building an
    /// explanation never triggers a search.
    #[must_use]
    pub fn explain(&self, reason: Reason<'_>, parameter: &str) -> Explanation {
        let parameter = parameter.to_string();
        match reason {
            Reason::Initial => Explanation::Initial { parameter },
            Reason::Goal => Explanation::Goal { parameter },
            Reason::Rule(rule) => {
                let (known, unknown): (Vec<Premise>, Vec<Premise>) = rule
                    .premises
                    .iter()
                    .cloned()
                    .partition(|p| self.known_cf(p).is_ok_and(is_true));
                Explanation::Rule {
                    parameter,
                    known,
                    remaining: rule.with_premises(unknown),
                }
            }
        }
    }

    /// Asks the collaborator for values of `parameter`, at most once per key.
    ///
    /// Rejected replies are asked again, carrying the rejection reason, up
    /// to `max_ask_attempts`; then the question counts as unanswered. A
    /// reply whose cfs cannot be combined, among themselves or with stored
    /// ones, is rejected and nothing from it is stored. Returns true if
    /// values were recorded.
    ///
    /// # Errors
    ///
    /// Propagates collaborator failures and fact store errors.
    pub fn ask_vals(
        &mut self,
        parameter: &Parameter,
        instance: &Instance,
        reason: Reason<'_>,
    ) -> EmycinResult<bool> {
        let key = FactKey::new(&parameter.name, instance);
        if !self.cache.mark_asked(&key) {
            return Ok(false);
        }
        self.stats.questions_asked += 1;

        let explanation = self.explain(reason, &parameter.name);
        let prompt = parameter.render_prompt(&instance.to_string());
        let mut rejection: Option<String> = None;

        for attempt in 1..=self.config.max_ask_attempts.max(1) {
            let query = Query {
                parameter,
                instance,
                prompt: &prompt,
                explanation: &explanation,
                rule: reason.rule(),
                rejection: rejection.as_deref(),
                attempt,
            };
            let why = match self.asker.ask(&query)? {
                Answer::Unknown => {
                    debug!(parameter = %parameter.name, %instance, "answered unknown");
                    return Ok(false);
                }
                Answer::Invalid(why) => why,
                Answer::Values(pairs) => match check_reply(parameter, &pairs) {
                    Err(why) => why,
                    Ok(()) => match self.facts.update_all(&parameter.name, instance, &pairs) {
                        Ok(()) => return Ok(true),
                        Err(EmycinError::Execution(ExecutionError::UndefinedCombination {
                            a,
                            b,
                        })) => format!("certainty factors {a} and {b} contradict each other"),
                        Err(e) => return Err(e),
                    },
                },
            };
            warn!(parameter = %parameter.name, %instance, attempt, %why, "reply rejected");
            rejection = Some(why);
        }

        warn!(parameter = %parameter.name, %instance, "no acceptable reply; treating as unknown");
        Ok(false)
    }
}

fn check_reply(parameter: &Parameter, pairs: &[(String, f64)]) -> Result<(), String> {
    if pairs.is_empty() {
        return Err("no value given".to_string());
    }
    for (value, cf) in pairs {
        if !parameter.accepts(value) {
            return Err(format!(
                "'{value}' is not {}",
                parameter.acceptance.help()
            ));
        }
        if !is_valid_cf(*cf) {
            return Err(format!("certainty factor {cf} is outside [-1, 1]"));
        }
    }
    Ok(())
}
