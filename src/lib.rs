//! # emycin - A backward-chaining rule interpreter with certainty factors
//!
//! Given a knowledge base of if-then rules and a set of goal parameters,
//! emycin determines values for those parameters on one or more problem
//! instances. Evidence comes from rules, from facts already established, and
//! from an external source of truth that is asked when rules cannot decide.
//!
//! ## Core Concepts
//!
//! - **Certainty factor**: a belief strength in [-1, 1], combined with the
//!   MYCIN laws (see [`confidence`])
//! - **Context / Instance**: a kind of entity and one occurrence of it
//! - **Parameter**: an attribute resolved for an instance
//! - **Rule**: a conjunction of premises implying conclusions, with its own cf
//! - **Session**: one consultation; resolves each (parameter, instance) once
//!
//! ## Usage
//!
//! ```rust
//! use emycin::{mycin, Answer, ScriptedAsker, Session};
//!
//! let kb = mycin::knowledge_base()?;
//! let asker = ScriptedAsker::new()
//!     .answer("site", Answer::value("blood"))
//!     .answer("gram", Answer::value("neg"))
//!     .answer("morphology", Answer::value("rod"))
//!     .answer("burn", Answer::value("serious"));
//!
//! let mut session = Session::new(&kb, asker);
//! let findings = session.run(&mycin::CONTEXTS)?;
//! let identity = findings[0].goal("identity").unwrap();
//! assert_eq!(identity[0].value, "pseudomonas");
//! # Ok::<(), emycin::EmycinError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Knowledge representation
pub mod confidence;
pub mod context;
pub mod error;
pub mod knowledge_base;
pub mod operation;
pub mod parameter;
pub mod rule;

// Inference
pub mod ask;
pub mod cache;
pub mod config;
pub mod engine;
pub mod explain;
pub mod facts;

pub mod mycin;

// Re-export primary types at crate root for convenience
pub use ask::{parse_reply, Answer, AskRecord, Asker, ConsoleAsker, Query, ScriptedAsker};
pub use cache::ResolutionCache;
pub use config::EngineConfig;
pub use context::{Context, Instance};
pub use engine::{emycin, Findings, GoalFindings, Session, SessionStats};
pub use error::{AskError, EmycinError, EmycinResult, ExecutionError, ValidationError};
pub use explain::{Explanation, Reason};
pub use facts::{Fact, FactKey, FactStore};
pub use knowledge_base::KnowledgeBase;
pub use operation::{OperationRegistry, Predicate};
pub use parameter::{Acceptance, Parameter, ReplyFormat, ValueSpec};
pub use rule::{Conclusion, Condition, Premise, Rule, RuleBuilder};
