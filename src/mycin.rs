//! A small slice of the MYCIN bacteremia knowledge base.
//!
//! Three contexts are consulted in order: the patient, a culture taken from
//! the patient, and an organism isolated from the culture. The organism's
//! identity is the only goal.

use crate::context::Context;
use crate::error::EmycinResult;
use crate::knowledge_base::KnowledgeBase;
use crate::parameter::{Parameter, ReplyFormat, ValueSpec};
use crate::rule::Rule;

/// Contexts in consultation order.
pub const CONTEXTS: [&str; 3] = ["patient", "culture", "organism"];

/// Builds the knowledge base.
///
/// # Errors
///
/// Only fails if the definitions below are inconsistent.
pub fn knowledge_base() -> EmycinResult<KnowledgeBase> {
    let mut kb = KnowledgeBase::new();

    kb.register_context(Context::new("patient").with_initial_data(["name", "sex", "age"]))?;
    kb.register_context(Context::new("culture").with_initial_data(["site", "days-old"]))?;
    kb.register_context(Context::new("organism").with_goals(["identity"]))?;

    define_parameters(&mut kb)?;
    define_rules(&mut kb)?;
    Ok(kb)
}

fn define_parameters(kb: &mut KnowledgeBase) -> EmycinResult<()> {
    let parameters = [
        // patient
        Parameter::new("name", "patient")
            .with_prompt("Patient's name:")
            .with_reply_format(ReplyFormat::Line),
        Parameter::new("sex", "patient").with_spec(ValueSpec::one_of(["male", "female"])),
        Parameter::new("age", "patient").with_spec(ValueSpec::number_between(0.0, 130.0)),
        Parameter::new("burn", "patient")
            .with_spec(ValueSpec::one_of(["no", "mild", "serious"]))
            .with_prompt("Is {instance} a burn patient? If so, mild or serious?"),
        Parameter::new("compromised-host", "patient")
            .with_spec(ValueSpec::YesNo)
            .with_prompt("Is {instance} a compromised host?"),
        // culture
        Parameter::new("site", "culture").with_spec(ValueSpec::one_of(["blood"])),
        Parameter::new("days-old", "culture")
            .with_spec(ValueSpec::number())
            .with_prompt("How many days old is this culture?"),
        // organism
        Parameter::new("identity", "organism")
            .with_spec(ValueSpec::one_of([
                "pseudomonas",
                "klebsiella",
                "enterobacteriaceae",
                "staphylococcus",
                "bacteroides",
                "streptococcus",
            ]))
            .ask_first(true),
        Parameter::new("gram", "organism")
            .with_spec(ValueSpec::one_of(["acid-fast", "pos", "neg"])),
        Parameter::new("morphology", "organism").with_spec(ValueSpec::one_of(["rod", "coccus"])),
        Parameter::new("aerobicity", "organism")
            .with_spec(ValueSpec::one_of(["aerobic", "anaerobic"])),
        Parameter::new("growth-conformation", "organism")
            .with_spec(ValueSpec::one_of(["chains", "pairs", "clumps"])),
    ];

    for parameter in parameters {
        kb.register_parameter(parameter)?;
    }
    Ok(())
}

fn define_rules(kb: &mut KnowledgeBase) -> EmycinResult<()> {
    let rules = [
        Rule::builder(52)
            .premise("site", "culture", "is", "blood")
            .premise("gram", "organism", "is", "neg")
            .premise("morphology", "organism", "is", "rod")
            .premise("burn", "patient", "is", "serious")
            .conclusion("identity", "organism", "is", "pseudomonas")
            .cf(0.4),
        Rule::builder(71)
            .premise("gram", "organism", "is", "pos")
            .premise("morphology", "organism", "is", "coccus")
            .premise("growth-conformation", "organism", "is", "clumps")
            .conclusion("identity", "organism", "is", "staphylococcus")
            .cf(0.7),
        Rule::builder(73)
            .premise("site", "culture", "is", "blood")
            .premise("gram", "organism", "is", "neg")
            .premise("morphology", "organism", "is", "rod")
            .premise("aerobicity", "organism", "is", "anaerobic")
            .conclusion("identity", "organism", "is", "bacteroides")
            .cf(0.9),
        Rule::builder(75)
            .premise("gram", "organism", "is", "neg")
            .premise("morphology", "organism", "is", "rod")
            .premise("compromised-host", "patient", "is", "yes")
            .conclusion("identity", "organism", "is", "pseudomonas")
            .cf(0.6),
        Rule::builder(107)
            .premise("gram", "organism", "is", "neg")
            .premise("morphology", "organism", "is", "rod")
            .premise("aerobicity", "organism", "is", "aerobic")
            .conclusion("identity", "organism", "is", "enterobacteriaceae")
            .cf(0.8),
        Rule::builder(165)
            .premise("gram", "organism", "is", "pos")
            .premise("morphology", "organism", "is", "coccus")
            .premise("growth-conformation", "organism", "is", "chains")
            .conclusion("identity", "organism", "is", "streptococcus")
            .cf(0.7),
    ];

    for builder in rules {
        let rule = builder.build(kb)?;
        kb.register_rule(rule)?;
    }
    Ok(())
}
