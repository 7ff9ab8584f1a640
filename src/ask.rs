//! The ask collaborator.
//!
//! When rules cannot settle a parameter (or before trying them, for
//! ask-first parameters) the engine asks an external source of truth. The
//! engine does not care how answers are obtained; it validates every reply
//! and asks again when a reply is malformed.

use std::collections::{HashMap, VecDeque};
use std::io::{BufRead, Write};

use crate::context::Instance;
use crate::error::AskError;
use crate::explain::Explanation;
use crate::parameter::{Parameter, ReplyFormat};
use crate::rule::Rule;

/// One question put to the collaborator.
#[derive(Debug)]
pub struct Query<'a> {
    /// Parameter being asked.
    pub parameter: &'a Parameter,
    /// Instance the answer is about.
    pub instance: &'a Instance,
    /// Rendered prompt.
    pub prompt: &'a str,
    /// Why the question is asked.
    pub explanation: &'a Explanation,
    /// The rule whose premise triggered the question, if any.
    pub rule: Option<&'a Rule>,
    /// Why the previous reply was rejected.
    pub rejection: Option<&'a str>,
    /// 1 for the first attempt.
    pub attempt: usize,
}

/// A reply from the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Nothing is known.
    Unknown,
    /// One or more (value, cf) pairs.
    Values(Vec<(String, f64)>),
    /// A reply that could not be read, with the reason. The engine asks again.
    Invalid(String),
}

impl Answer {
    /// A single value, certainly true.
    #[must_use]
    pub fn value(value: impl Into<String>) -> Self {
        Self::Values(vec![(value.into(), 1.0)])
    }

    /// A single value with a cf.
    #[must_use]
    pub fn with_cf(value: impl Into<String>, cf: f64) -> Self {
        Self::Values(vec![(value.into(), cf)])
    }
}

/// External source of parameter values.
pub trait Asker {
    /// Answers a query.
    ///
    /// # Errors
    ///
    /// Returns an error only when the source itself fails. A reply that
    /// cannot be read is returned as [`Answer::Invalid`]; one that reads but
    /// is not acceptable is returned as-is. The engine rejects both.
    fn ask(&mut self, query: &Query<'_>) -> Result<Answer, AskError>;
}

/// Parses a raw reply according to a parameter's reply format.
///
/// In [`ReplyFormat::Pairs`] a reply is a comma-separated list of
/// `value [cf]` items, values lowercased and cf defaulting to 1.0. In
/// [`ReplyFormat::Line`] the whole trimmed line is one certain value.
///
/// # Errors
///
/// Returns a message describing the malformed part of the reply.
pub fn parse_reply(line: &str, format: ReplyFormat) -> Result<Vec<(String, f64)>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Err("empty reply".to_string());
    }
    match format {
        ReplyFormat::Line => Ok(vec![(line.to_string(), 1.0)]),
        ReplyFormat::Pairs => line
            .split(',')
            .map(|item| {
                let tokens: Vec<&str> = item.split_whitespace().collect();
                match tokens.as_slice() {
                    [value] => Ok((value.to_lowercase(), 1.0)),
                    [value, cf] => cf
                        .parse::<f64>()
                        .map(|cf| (value.to_lowercase(), cf))
                        .map_err(|_| format!("'{cf}' is not a certainty factor")),
                    [] => Err("empty item in reply".to_string()),
                    _ => Err(format!("cannot read '{}' as a value and a cf", item.trim())),
                }
            })
            .collect(),
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Answer(Answer),
    Text(String),
}

/// Collaborator replaying canned replies, keyed by parameter name.
///
/// Replies queued for a parameter are consumed in order; once exhausted (or
/// for a parameter never scripted) the reply is [`Answer::Unknown`]. Every
/// query is logged.
#[derive(Debug, Default)]
pub struct ScriptedAsker {
    script: HashMap<String, VecDeque<Scripted>>,
    log: Vec<AskRecord>,
}

/// A query seen by [`ScriptedAsker`].
#[derive(Debug, Clone, PartialEq)]
pub struct AskRecord {
    /// Parameter asked.
    pub parameter: String,
    /// Instance asked about.
    pub instance: Instance,
    /// Rendered explanation at the time of asking.
    pub explanation: String,
    /// Rejection message carried by the query.
    pub rejection: Option<String>,
}

impl ScriptedAsker {
    /// Creates an asker with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a structured answer.
    #[must_use]
    pub fn answer(mut self, parameter: impl Into<String>, answer: Answer) -> Self {
        self.script
            .entry(parameter.into())
            .or_default()
            .push_back(Scripted::Answer(answer));
        self
    }

    /// Queues a raw text reply, parsed with the parameter's reply format.
    #[must_use]
    pub fn reply(mut self, parameter: impl Into<String>, text: impl Into<String>) -> Self {
        self.script
            .entry(parameter.into())
            .or_default()
            .push_back(Scripted::Text(text.into()));
        self
    }

    /// Every query seen so far.
    #[must_use]
    pub fn log(&self) -> &[AskRecord] {
        &self.log
    }

    /// Number of times `parameter` was asked.
    #[must_use]
    pub fn times_asked(&self, parameter: &str) -> usize {
        self.log.iter().filter(|r| r.parameter == parameter).count()
    }
}

impl Asker for ScriptedAsker {
    fn ask(&mut self, query: &Query<'_>) -> Result<Answer, AskError> {
        self.log.push(AskRecord {
            parameter: query.parameter.name.clone(),
            instance: query.instance.clone(),
            explanation: query.explanation.to_string(),
            rejection: query.rejection.map(str::to_string),
        });

        let next = self
            .script
            .get_mut(&query.parameter.name)
            .and_then(VecDeque::pop_front);
        Ok(match next {
            None => Answer::Unknown,
            Some(Scripted::Answer(answer)) => answer,
            Some(Scripted::Text(text)) => {
                if is_unknown(&text) {
                    Answer::Unknown
                } else {
                    parse_reply(&text, query.parameter.reply_format)
                        .map_or_else(Answer::Invalid, Answer::Values)
                }
            }
        })
    }
}

fn is_unknown(reply: &str) -> bool {
    matches!(reply.trim().to_lowercase().as_str(), "unknown" | "unk")
}

/// Interactive collaborator over a line reader and a writer.
///
/// Besides value replies it understands `?` (acceptable values), `why`
/// (the explanation), `rule` (the active rule) and `unknown`.
#[derive(Debug)]
pub struct ConsoleAsker<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleAsker<R, W> {
    /// Creates a console asker.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consumes the asker, returning the writer.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Asker for ConsoleAsker<R, W> {
    fn ask(&mut self, query: &Query<'_>) -> Result<Answer, AskError> {
        if let Some(rejection) = query.rejection {
            writeln!(
                self.output,
                "Illegal reply ({rejection}). Type ? to see legal ones."
            )?;
        }

        loop {
            write!(self.output, "{} ", query.prompt)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(AskError::Closed {
                    parameter: query.parameter.name.clone(),
                });
            }

            match line.trim().to_lowercase().as_str() {
                "" => continue,
                "?" | "help" => {
                    writeln!(
                        self.output,
                        "A legal reply is {}, optionally followed by a certainty factor.",
                        query.parameter.acceptance.help()
                    )?;
                }
                "why" => {
                    writeln!(self.output, "[Why is the value of {} being asked for?]", query.parameter.name)?;
                    write!(self.output, "{}", query.explanation)?;
                }
                "rule" => match query.rule {
                    Some(rule) => write!(self.output, "{rule}")?,
                    None => writeln!(
                        self.output,
                        "No rule is active; {} is an initial or goal parameter.",
                        query.parameter.name
                    )?,
                },
                "unknown" | "unk" => return Ok(Answer::Unknown),
                _ => match parse_reply(&line, query.parameter.reply_format) {
                    Ok(pairs) => return Ok(Answer::Values(pairs)),
                    Err(reason) => writeln!(self.output, "Cannot read reply: {reason}")?,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ValueSpec;

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_reply("Neg .8, pos -0.3", ReplyFormat::Pairs).unwrap();
        assert_eq!(
            pairs,
            vec![("neg".to_string(), 0.8), ("pos".to_string(), -0.3)]
        );

        let single = parse_reply("rod", ReplyFormat::Pairs).unwrap();
        assert_eq!(single, vec![("rod".to_string(), 1.0)]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_reply("   ", ReplyFormat::Pairs).is_err());
        assert!(parse_reply("neg high", ReplyFormat::Pairs).is_err());
        assert!(parse_reply("neg 0.5 extra", ReplyFormat::Pairs).is_err());
        assert!(parse_reply("neg,,pos", ReplyFormat::Pairs).is_err());
    }

    #[test]
    fn test_parse_line() {
        let pairs = parse_reply("  Sylvia Fischer \n", ReplyFormat::Line).unwrap();
        assert_eq!(pairs, vec![("Sylvia Fischer".to_string(), 1.0)]);
    }

    fn query_parts() -> (Parameter, Instance, Explanation) {
        (
            Parameter::new("gram", "organism").with_spec(ValueSpec::one_of(["pos", "neg"])),
            Instance::new("organism", 1),
            Explanation::Goal {
                parameter: "gram".to_string(),
            },
        )
    }

    #[test]
    fn test_scripted_asker_consumes_in_order() {
        let (parm, inst, why) = query_parts();
        let query = Query {
            parameter: &parm,
            instance: &inst,
            prompt: "What is the gram of organism-1?",
            explanation: &why,
            rule: None,
            rejection: None,
            attempt: 1,
        };
        let mut asker = ScriptedAsker::new()
            .reply("gram", "neg 0.7")
            .answer("gram", Answer::value("pos"));

        assert_eq!(asker.ask(&query).unwrap(), Answer::with_cf("neg", 0.7));
        assert_eq!(asker.ask(&query).unwrap(), Answer::value("pos"));
        assert_eq!(asker.ask(&query).unwrap(), Answer::Unknown);
        assert_eq!(asker.times_asked("gram"), 3);
        assert!(asker.log()[0].explanation.contains("goal parameters"));
    }

    #[test]
    fn test_scripted_asker_reports_unreadable_reply() {
        let (parm, inst, why) = query_parts();
        let query = Query {
            parameter: &parm,
            instance: &inst,
            prompt: "What is the gram of organism-1?",
            explanation: &why,
            rule: None,
            rejection: None,
            attempt: 1,
        };
        let mut asker = ScriptedAsker::new().reply("gram", "neg high").reply("gram", "unk");
        assert_eq!(
            asker.ask(&query).unwrap(),
            Answer::Invalid("'high' is not a certainty factor".to_string())
        );
        assert_eq!(asker.ask(&query).unwrap(), Answer::Unknown);
    }

    #[test]
    fn test_console_asker_help_why_then_value() {
        let (parm, inst, why) = query_parts();
        let query = Query {
            parameter: &parm,
            instance: &inst,
            prompt: "What is the gram of organism-1?",
            explanation: &why,
            rule: None,
            rejection: None,
            attempt: 1,
        };
        let input = "?\nwhy\nrule\nneg 0.9\n".as_bytes();
        let mut asker = ConsoleAsker::new(input, Vec::new());
        let answer = asker.ask(&query).unwrap();
        assert_eq!(answer, Answer::with_cf("neg", 0.9));

        let out = String::from_utf8(asker.into_output()).unwrap();
        assert!(out.contains("one of: pos, neg"));
        assert!(out.contains("gram is one of the goal parameters."));
        assert!(out.contains("No rule is active"));
    }

    #[test]
    fn test_console_asker_unknown_and_closed() {
        let (parm, inst, why) = query_parts();
        let query = Query {
            parameter: &parm,
            instance: &inst,
            prompt: "?",
            explanation: &why,
            rule: None,
            rejection: Some("value 'purple' is not accepted"),
            attempt: 2,
        };
        let mut asker = ConsoleAsker::new("unk\n".as_bytes(), Vec::new());
        assert_eq!(asker.ask(&query).unwrap(), Answer::Unknown);
        let out = String::from_utf8(asker.into_output()).unwrap();
        assert!(out.contains("Illegal reply"));

        let mut closed = ConsoleAsker::new("".as_bytes(), Vec::new());
        assert!(matches!(closed.ask(&query), Err(AskError::Closed { .. })));
    }
}
