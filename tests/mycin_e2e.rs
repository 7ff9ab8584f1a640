use emycin::{
    mycin, Answer, Condition, ConsoleAsker, Context, FactKey, KnowledgeBase, Parameter, Reason,
    Rule, ScriptedAsker, Session, ValidationError, ValueSpec,
};

const EPS: f64 = 1e-9;

fn full_script() -> ScriptedAsker {
    ScriptedAsker::new()
        .reply("name", "Sylvia Fischer")
        .answer("sex", Answer::value("female"))
        .answer("age", Answer::value("27"))
        .answer("site", Answer::value("blood"))
        .answer("days-old", Answer::value("3"))
        .answer("gram", Answer::value("neg"))
        .answer("morphology", Answer::value("rod"))
        .answer("burn", Answer::value("serious"))
        .reply("aerobicity", "aerobic .6")
        .answer("compromised-host", Answer::value("yes"))
}

/// Session over the MYCIN base with one instance of each context and the
/// premises of rule 52 already established.
fn seeded_session(kb: &KnowledgeBase, burn_cf: f64) -> Session<'_, ScriptedAsker> {
    let mut session = Session::new(kb, ScriptedAsker::new());
    let patient = session.new_instance("patient").unwrap();
    let culture = session.new_instance("culture").unwrap();
    let organism = session.new_instance("organism").unwrap();

    let facts = session.facts_mut();
    facts.update("site", &culture, "blood", 1.0).unwrap();
    facts.update("gram", &organism, "neg", 1.0).unwrap();
    facts.update("morphology", &organism, "rod", 1.0).unwrap();
    facts.update("burn", &patient, "serious", burn_cf).unwrap();
    session
}

#[test]
fn rule_52_concludes_pseudomonas() {
    let kb = mycin::knowledge_base().unwrap();
    let mut session = seeded_session(&kb, 1.0);
    let rule = kb.rule(52).unwrap();

    let cf = session.use_rule(rule).unwrap();
    assert!((cf - 1.0).abs() < EPS);

    let organism = session.current_instance("organism").unwrap().clone();
    assert!((session.facts().cf("identity", &organism, "pseudomonas") - 0.4).abs() < EPS);
}

#[test]
fn rejected_rule_concludes_nothing() {
    let kb = mycin::knowledge_base().unwrap();
    let mut session = seeded_session(&kb, -1.0);
    let rule = kb.rule(52).unwrap();

    let cf = session.use_rule(rule).unwrap();
    assert_eq!(cf, 0.0);

    let organism = session.current_instance("organism").unwrap().clone();
    assert!(session.facts().values("identity", &organism).is_empty());
    // Rejection happens before any premise is searched.
    assert!(session.asker().log().is_empty());
}

#[test]
fn two_rules_combine_evidence() {
    let mut kb = KnowledgeBase::new();
    kb.register_context(Context::new("box").with_goals(["label"]))
        .unwrap();
    kb.register_parameter(Parameter::new("mark", "box").with_spec(ValueSpec::YesNo))
        .unwrap();
    kb.register_parameter(Parameter::new("label", "box")).unwrap();
    for (number, cf) in [(1, 0.8), (2, 0.6)] {
        let rule = Rule::builder(number)
            .premise("mark", "box", "is", "yes")
            .conclusion("label", "box", "is", "fragile")
            .cf(cf)
            .build(&kb)
            .unwrap();
        kb.register_rule(rule).unwrap();
    }

    let asker = ScriptedAsker::new().answer("mark", Answer::value("yes"));
    let mut session = Session::new(&kb, asker);
    let report = session.run(&["box"]).unwrap();

    let label = report[0].goal("label").unwrap();
    assert_eq!(label[0].value, "fragile");
    assert!((label[0].cf - 0.92).abs() < EPS);
    assert_eq!(session.asker().times_asked("label"), 0);
}

#[test]
fn false_premise_stops_evaluation() {
    let mut kb = KnowledgeBase::new();
    kb.register_context(Context::new("thing")).unwrap();
    for name in ["a", "b", "c"] {
        kb.register_parameter(Parameter::new(name, "thing").with_spec(ValueSpec::YesNo))
            .unwrap();
    }
    let rule = Rule::builder(1)
        .premise("a", "thing", "is", "yes")
        .premise("b", "thing", "is", "yes")
        .conclusion("c", "thing", "is", "yes")
        .build(&kb)
        .unwrap();
    kb.register_rule(rule).unwrap();

    let asker = ScriptedAsker::new()
        .answer("a", Answer::value("no"))
        .answer("b", Answer::value("yes"));
    let mut session = Session::new(&kb, asker);
    let thing = session.new_instance("thing").unwrap();

    let rule = kb.rule(1).unwrap();
    let cf = session
        .satisfy_premises(&rule.premises, 1.0, Reason::Rule(rule))
        .unwrap();
    assert_eq!(cf, -1.0);
    assert_eq!(session.asker().times_asked("a"), 1);
    assert_eq!(session.asker().times_asked("b"), 0);
    assert!(session.cache().known(&FactKey::new("b", &thing)).is_none());
}

#[test]
fn full_consultation_ranks_identities() {
    let kb = mycin::knowledge_base().unwrap();
    let mut session = Session::new(&kb, full_script());

    let report = session.run(&mycin::CONTEXTS).unwrap();
    assert_eq!(report.len(), 1);

    let identity = report[0].goal("identity").unwrap();
    assert_eq!(identity.len(), 2);
    assert_eq!(identity[0].value, "pseudomonas");
    assert!((identity[0].cf - 0.76).abs() < EPS);
    assert_eq!(identity[1].value, "enterobacteriaceae");
    assert!((identity[1].cf - 0.48).abs() < EPS);

    assert_eq!(
        report[0].to_string(),
        "Findings for organism-1:\n  identity: pseudomonas (0.76), enterobacteriaceae (0.48)\n"
    );

    let asked: Vec<&str> = session
        .asker()
        .log()
        .iter()
        .map(|r| r.parameter.as_str())
        .collect();
    assert_eq!(
        asked,
        vec![
            "name",
            "sex",
            "age",
            "site",
            "days-old",
            "identity",
            "gram",
            "morphology",
            "burn",
            "aerobicity",
            "compromised-host",
        ]
    );
    assert_eq!(session.stats().questions_asked, 11);
    assert_eq!(session.stats().rules_applied, 6);
}

#[test]
fn questions_are_explained() {
    let kb = mycin::knowledge_base().unwrap();
    let mut session = Session::new(&kb, full_script());
    session.run(&mycin::CONTEXTS).unwrap();

    let log = session.asker().log();
    let identity = log.iter().find(|r| r.parameter == "identity").unwrap();
    assert_eq!(identity.explanation, "identity is one of the goal parameters.\n");

    let burn = log.iter().find(|r| r.parameter == "burn").unwrap();
    assert!(burn.explanation.starts_with("It is known that:\n"));
    assert!(burn.explanation.contains("     1) the site of the culture is blood\n"));
    assert!(burn.explanation.contains("     3) the morphology of the organism is rod\n"));
    assert!(burn
        .explanation
        .contains("Therefore,\nRule 52:\n  If\n     1) the burn of the patient is serious\n"));

    // gram is the first unknown premise of rule 52: nothing is known yet but the site.
    let gram = log.iter().find(|r| r.parameter == "gram").unwrap();
    assert!(gram.explanation.contains("     1) the site of the culture is blood\n"));
    assert!(gram.explanation.contains("If\n     1) the gram of the organism is neg\n"));
}

#[test]
fn repeated_find_out_does_no_work() {
    let kb = mycin::knowledge_base().unwrap();
    let mut session = Session::new(&kb, full_script());
    session.run(&mycin::CONTEXTS).unwrap();

    let organism = session.current_instance("organism").unwrap().clone();
    let before = session.stats();
    assert!(session.find_out("identity", &organism).unwrap());
    let after = session.stats();

    assert_eq!(after.rules_applied, before.rules_applied);
    assert_eq!(after.questions_asked, before.questions_asked);
    assert_eq!(after.cache_hits, before.cache_hits + 1);
}

#[test]
fn multi_value_reply_records_each_value() {
    let kb = mycin::knowledge_base().unwrap();
    let asker = ScriptedAsker::new().reply("gram", "neg .8, pos -0.3");
    let mut session = Session::new(&kb, asker);
    let organism = session.new_instance("organism").unwrap();

    assert!(session.find_out("gram", &organism).unwrap());
    assert!((session.facts().cf("gram", &organism, "neg") - 0.8).abs() < EPS);
    assert!((session.facts().cf("gram", &organism, "pos") + 0.3).abs() < EPS);
}

#[test]
fn console_consultation() {
    let kb = mycin::knowledge_base().unwrap();
    let input = "Sylvia Fischer\n\
                 purple\n\
                 female\n\
                 27\n\
                 blood\n\
                 3\n\
                 unknown\n\
                 neg\n\
                 rod\n\
                 why\n\
                 serious\n\
                 aerobic .6\n\
                 yes\n";
    let mut output = Vec::new();
    let report = {
        let asker = ConsoleAsker::new(input.as_bytes(), &mut output);
        let mut session = Session::new(&kb, asker);
        session.run(&mycin::CONTEXTS).unwrap()
    };

    let identity = report[0].goal("identity").unwrap();
    assert_eq!(identity[0].value, "pseudomonas");

    let out = String::from_utf8(output).unwrap();
    assert!(out.contains("Patient's name:"));
    assert!(out.contains("Illegal reply ('purple' is not one of: male, female)"));
    assert!(out.contains("What is the sex of patient-1?"));
    assert!(out.contains("Is patient-1 a burn patient? If so, mild or serious?"));
    assert!(out.contains("[Why is the value of burn being asked for?]"));
    assert!(out.contains("It is known that:"));
    assert!(out.contains("Is patient-1 a compromised host?"));
}

#[test]
fn closed_input_is_an_error() {
    let kb = mycin::knowledge_base().unwrap();
    let asker = ConsoleAsker::new("Sylvia Fischer\n".as_bytes(), Vec::new());
    let mut session = Session::new(&kb, asker);
    let err = session.run(&mycin::CONTEXTS).unwrap_err();
    assert!(err.is_ask());
}

#[test]
fn contradictory_reply_is_asked_again() {
    let kb = mycin::knowledge_base().unwrap();
    let asker = ScriptedAsker::new()
        .reply("gram", "neg 1, neg -1")
        .reply("gram", "pos");
    let mut session = Session::new(&kb, asker);
    let organism = session.new_instance("organism").unwrap();

    assert!(session.find_out("gram", &organism).unwrap());
    let gram = session.facts().values("gram", &organism);
    assert_eq!(gram.len(), 1);
    assert_eq!(gram[0].value, "pos");
    assert_eq!(session.asker().times_asked("gram"), 2);

    // Settled: a second lookup neither asks nor changes the outcome.
    assert!(session.find_out("gram", &organism).unwrap());
    assert_eq!(session.asker().times_asked("gram"), 2);
}

#[test]
fn hand_built_rule_is_validated_on_registration() {
    let mut kb = mycin::knowledge_base().unwrap();
    let mut rule = kb.rule(52).unwrap().clone();
    rule.number = 999;
    rule.premises[1] = Condition {
        parameter: "gram".to_string(),
        context: "patient".to_string(),
        operation: "resembles".to_string(),
        value: "purple".to_string(),
    };

    let err = kb.register_rule(rule).unwrap_err();
    assert!(matches!(err, ValidationError::ContextMismatch { .. }));
    assert!(kb.rule(999).is_none());
    assert_eq!(kb.rules_for("identity").len(), 6);
}
