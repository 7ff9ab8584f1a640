//! Parameters and the acceptance capability guarding their values.
//!
//! A parameter is a named attribute of a context ("the gram stain of an
//! organism"). Every value that enters the system for a parameter, from a
//! rule condition or from an ask reply, must pass the parameter's
//! [`Acceptance`] check.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Capability deciding which values a parameter accepts.
pub trait Acceptance: fmt::Debug + Send + Sync {
    /// Returns true if `value` is acceptable.
    fn verify(&self, value: &str) -> bool;

    /// Short description of the acceptable values.
    fn help(&self) -> String;

    /// Checks that the capability itself is well-formed.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the capability can never be used.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Built-in acceptance rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueSpec {
    /// Any non-empty value.
    Any,

    /// One of an enumerated set of values.
    OneOf {
        /// Allowed values.
        values: Vec<String>,
    },

    /// `yes` or `no`.
    YesNo,

    /// A number within optional bounds (inclusive).
    Number {
        /// Minimum value.
        min: Option<f64>,
        /// Maximum value.
        max: Option<f64>,
    },

    /// A value matching a regular expression (anchored at both ends).
    Pattern {
        /// Regex source.
        pattern: String,
    },
}

impl ValueSpec {
    /// Creates an enumerated spec.
    #[must_use]
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an unbounded numeric spec.
    #[must_use]
    pub const fn number() -> Self {
        Self::Number {
            min: None,
            max: None,
        }
    }

    /// Creates a bounded numeric spec.
    #[must_use]
    pub const fn number_between(min: f64, max: f64) -> Self {
        Self::Number {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Creates a regex spec.
    #[must_use]
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
        }
    }

    fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$"))
    }
}

impl Acceptance for ValueSpec {
    fn verify(&self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        match self {
            Self::Any => true,
            Self::OneOf { values } => values.iter().any(|v| v == value),
            Self::YesNo => value == "yes" || value == "no",
            Self::Number { min, max } => match value.parse::<f64>() {
                Ok(n) if n.is_finite() => {
                    min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m)
                }
                _ => false,
            },
            Self::Pattern { pattern } => {
                Self::anchored(pattern).map_or(false, |re| re.is_match(value))
            }
        }
    }

    fn help(&self) -> String {
        match self {
            Self::Any => "any value".to_string(),
            Self::OneOf { values } => format!("one of: {}", values.join(", ")),
            Self::YesNo => "yes or no".to_string(),
            Self::Number { min, max } => match (min, max) {
                (Some(lo), Some(hi)) => format!("a number between {lo} and {hi}"),
                (Some(lo), None) => format!("a number no less than {lo}"),
                (None, Some(hi)) => format!("a number no greater than {hi}"),
                (None, None) => "a number".to_string(),
            },
            Self::Pattern { pattern } => format!("a value matching /{pattern}/"),
        }
    }

    fn check(&self) -> Result<(), String> {
        match self {
            Self::OneOf { values } if values.is_empty() => {
                Err("enumerated value list cannot be empty".to_string())
            }
            Self::OneOf { values } if values.iter().any(|v| v.trim().is_empty()) => {
                Err("enumerated values cannot be blank".to_string())
            }
            Self::Number {
                min: Some(lo),
                max: Some(hi),
            } if lo > hi => Err(format!("minimum {lo} exceeds maximum {hi}")),
            Self::Number { min, max }
                if min.is_some_and(f64::is_nan) || max.is_some_and(f64::is_nan) =>
            {
                Err("numeric bounds cannot be NaN".to_string())
            }
            Self::Pattern { pattern } => Self::anchored(pattern)
                .map(|_| ())
                .map_err(|e| format!("invalid pattern '{pattern}': {e}")),
            _ => Ok(()),
        }
    }
}

/// How a raw reply for a parameter is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyFormat {
    /// Comma-separated `value [cf]` pairs.
    #[default]
    Pairs,

    /// The whole line is a single value, certainly true.
    Line,
}

/// Default prompt template.
pub const DEFAULT_PROMPT: &str = "What is the {parameter} of {instance}?";

/// A named attribute of a context.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Unique name.
    pub name: String,

    /// Owning context name (empty for a bare default parameter).
    pub context: String,

    /// Acceptance capability.
    pub acceptance: Arc<dyn Acceptance>,

    /// Prompt template; `{parameter}` and `{instance}` are substituted.
    pub prompt: String,

    /// Ask before trying rules.
    pub ask_first: bool,

    /// How replies are read.
    pub reply_format: ReplyFormat,
}

impl Parameter {
    /// Creates a parameter accepting any value.
    #[must_use]
    pub fn new(name: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: context.into(),
            acceptance: Arc::new(ValueSpec::Any),
            prompt: DEFAULT_PROMPT.to_string(),
            ask_first: false,
            reply_format: ReplyFormat::Pairs,
        }
    }

    /// The default parameter used when a name was never registered.
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    /// Sets a built-in acceptance spec.
    #[must_use]
    pub fn with_spec(self, spec: ValueSpec) -> Self {
        self.with_acceptance(Arc::new(spec))
    }

    /// Sets a custom acceptance capability.
    #[must_use]
    pub fn with_acceptance(mut self, acceptance: Arc<dyn Acceptance>) -> Self {
        self.acceptance = acceptance;
        self
    }

    /// Sets the prompt template.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Sets the ask-first flag.
    #[must_use]
    pub const fn ask_first(mut self, ask_first: bool) -> Self {
        self.ask_first = ask_first;
        self
    }

    /// Sets the reply format.
    #[must_use]
    pub const fn with_reply_format(mut self, reply_format: ReplyFormat) -> Self {
        self.reply_format = reply_format;
        self
    }

    /// Returns true if `value` passes the acceptance check.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        self.acceptance.verify(value)
    }

    /// Renders the prompt for an instance.
    #[must_use]
    pub fn render_prompt(&self, instance: &str) -> String {
        self.prompt
            .replace("{parameter}", &self.name)
            .replace("{instance}", instance)
    }
}
