//! Rule Source Tests
//!
//! Rules reach the engine three ways: the DSL, native JSON and translated
//! foreign descriptors. Each must drive the same derivation.

use lexrule::annotation::AnnotationRegistry;
use lexrule::dsl::RuleCompiler;
use lexrule::engine::{Engine, EngineConfig};
use lexrule::graph::Graph;
use lexrule::interpretation::Interpretation;
use lexrule::rules::{DescriptorTranslator, ForeignRuleDescriptor, NativeRule, Translator};

fn graph() -> Graph {
    Graph::new()
        .with_node("A", &["court"])
        .with_node("B", &["court", "precedential"])
        .with_edge("A", "B", &["cites"])
}

fn run(rules: &[NativeRule]) -> Interpretation {
    let e = Engine::new(EngineConfig::default(), AnnotationRegistry::with_builtins()).unwrap();
    e.validate_rules(rules).unwrap();
    e.run(&graph(), rules, 1, -1, -1.0, false).unwrap()
}

const DSL: &str = "rule relies: relies_on(x,y) :- cites(x,y), precedential(y); ann=maximum; infer_edges=authority";

const DESCRIPTORS: &str = r#"[{
    "name": "relies",
    "head": {"predicate": "relies_on", "args": ["x", "y"]},
    "body": [
        {"predicate": "cites", "args": ["x", "y"]},
        {"predicate": "precedential", "args": ["y"]}
    ],
    "annotation": "maximum",
    "infer_edges": true
}]"#;

/// DSL, JSON and descriptor forms derive the same facts.
#[test]
fn test_sources_agree() {
    let from_dsl = RuleCompiler::new().unwrap().compile(DSL).rules;
    assert_eq!(from_dsl.len(), 1);

    let json = serde_json::to_string(&from_dsl).unwrap();
    let from_json: Vec<NativeRule> = serde_json::from_str(&json).unwrap();
    assert_eq!(from_json, from_dsl);

    let descriptors: Vec<ForeignRuleDescriptor> = serde_json::from_str(DESCRIPTORS).unwrap();
    let from_foreign = DescriptorTranslator::default().translate_all(&descriptors).unwrap();

    let dsl_facts = run(&from_dsl);
    let foreign_facts = run(&from_foreign);
    assert!(dsl_facts.has_fact("relies_on(A,B)"));
    assert!(dsl_facts.has_fact("authority(A,B)"));
    assert!(foreign_facts.has_fact("relies_on(A,B)"));
    assert_eq!(
        dsl_facts.get_fact("relies_on(A,B)").map(|i| i.bounds()),
        foreign_facts.get_fact("relies_on(A,B)").map(|i| i.bounds()),
    );
}

/// Malformed DSL lines are reported and the rest still runs.
#[test]
fn test_lenient_dsl_keeps_good_lines() {
    let source = "\
rule ok: cited(y) :- cites(x,y)
this is not a rule
rule broken: cited(y) :- cites(x,y); delta=soon
";
    let compilation = RuleCompiler::new().unwrap().compile(source);
    assert_eq!(compilation.rules.len(), 2);
    assert_eq!(compilation.diagnostics.len(), 2);
    assert_eq!(compilation.diagnostics[0].line, 2);
    assert!(compilation.diagnostics[1].rule_kept);

    let interp = run(&compilation.rules);
    assert!(interp.has_fact("cited(B)"));
}

/// A malformed clause drops its rule instead of loosening it.
#[test]
fn test_bad_clause_never_becomes_a_fact() {
    let compilation = RuleCompiler::new().unwrap().compile("rule r: h(x) :- a(x):[0.9,0.1]");
    assert!(compilation.rules.is_empty());
    assert!(!compilation.diagnostics[0].rule_kept);

    let interp = run(&compilation.rules);
    assert!(interp.is_empty());
}

/// A foreign rule with a three-argument head is refused.
#[test]
fn test_translation_rejects_bad_arity() {
    let descriptors: Vec<ForeignRuleDescriptor> = serde_json::from_str(
        r#"[{"name": "odd", "head": {"predicate": "p", "args": ["a", "b", "c"]}}]"#,
    )
    .unwrap();
    let err = DescriptorTranslator::default().translate_all(&descriptors).unwrap_err();
    assert!(err.to_string().contains("odd"));
}
