//! Foreign rule translation
//!
//! Rule exports from other reasoning systems are compiled into `NativeRule`
//! through an explicit `Translator`, one implementation per source system.

use serde::{Deserialize, Serialize};

use super::errors::{RuleError, RuleResult};
use super::rule::{Clause, NativeRule, RuleType, ThresholdSpec};

/// Compiles rules from one external source system into native rules
pub trait Translator {
    /// The source system's rule representation
    type Foreign;

    /// Name of the source system, used in error messages
    fn source_system(&self) -> &str;

    /// Translates one foreign rule. The result is already validated.
    fn translate(&self, foreign: &Self::Foreign) -> RuleResult<NativeRule>;

    /// Translates a batch, failing on the first rule that cannot be translated
    fn translate_all(&self, foreign: &[Self::Foreign]) -> RuleResult<Vec<NativeRule>> {
        foreign.iter().map(|f| self.translate(f)).collect()
    }
}

/// A predicate applied to arguments, as exported by the source system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignAtom {
    pub predicate: String,
    pub args: Vec<String>,
    #[serde(default)]
    pub bound: Option<(f64, f64)>,
}

/// Rule descriptor in the shape prior engines export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignRuleDescriptor {
    pub name: String,
    pub head: ForeignAtom,
    #[serde(default)]
    pub body: Vec<ForeignAtom>,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub weights: Vec<f64>,
    #[serde(default)]
    pub thresholds: Vec<ThresholdSpec>,
    #[serde(default)]
    pub delay: u32,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub infer_edges: bool,
}

/// Translator for `ForeignRuleDescriptor` exports
#[derive(Debug, Clone)]
pub struct DescriptorTranslator {
    source: String,
}

impl DescriptorTranslator {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    fn clause_for(&self, atom: &ForeignAtom) -> RuleResult<Clause> {
        let clause = match atom.args.as_slice() {
            [v] => Clause::node(&atom.predicate, v),
            [u, v] => Clause::edge(&atom.predicate, u, v),
            _ => {
                return Err(RuleError::translation(
                    &self.source,
                    format!(
                        "body atom '{}' has {} arguments",
                        atom.predicate,
                        atom.args.len()
                    ),
                ))
            }
        };
        Ok(match atom.bound {
            Some((lo, hi)) => clause.with_bound(lo, hi),
            None => clause,
        })
    }
}

impl Default for DescriptorTranslator {
    fn default() -> Self {
        Self::new("descriptor")
    }
}

impl Translator for DescriptorTranslator {
    type Foreign = ForeignRuleDescriptor;

    fn source_system(&self) -> &str {
        &self.source
    }

    fn translate(&self, foreign: &ForeignRuleDescriptor) -> RuleResult<NativeRule> {
        let rule_type = match foreign.head.args.len() {
            1 => RuleType::Node,
            2 => RuleType::Edge,
            n => {
                return Err(RuleError::translation(
                    &self.source,
                    format!("rule '{}': head has {} arguments", foreign.name, n),
                ))
            }
        };

        let mut rule = NativeRule::with_head(
            &foreign.name,
            rule_type,
            &foreign.head.predicate,
            foreign.head.args.clone(),
        )
        .with_delta(foreign.delay)
        .with_static(foreign.is_static);

        for atom in &foreign.body {
            rule.clauses.push(self.clause_for(atom)?);
        }
        rule.thresholds = foreign.thresholds.clone();
        rule.infer_edges = foreign.infer_edges && rule_type == RuleType::Edge;

        match &foreign.annotation {
            Some(name) => {
                let weights = if foreign.weights.is_empty() {
                    vec![1.0; rule.clauses.len()]
                } else {
                    foreign.weights.clone()
                };
                rule = rule.with_ann_fn(name, weights);
            }
            None => rule.head_bound = foreign.head.bound,
        }

        rule.validate()
            .map_err(|e| RuleError::translation(&self.source, e.to_string()))?;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(predicate: &str, args: &[&str]) -> ForeignAtom {
        ForeignAtom {
            predicate: predicate.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            bound: None,
        }
    }

    fn descriptor() -> ForeignRuleDescriptor {
        ForeignRuleDescriptor {
            name: "legacy_7".into(),
            head: atom("support", &["x"]),
            body: vec![atom("cites", &["x", "y"]), atom("precedential", &["y"])],
            annotation: Some("average".into()),
            weights: Vec::new(),
            thresholds: Vec::new(),
            delay: 1,
            is_static: false,
            infer_edges: false,
        }
    }

    #[test]
    fn test_translate_descriptor() {
        let rule = DescriptorTranslator::default().translate(&descriptor()).unwrap();
        assert_eq!(rule.rule_type, RuleType::Node);
        assert_eq!(rule.clauses.len(), 2);
        assert_eq!(rule.weights, vec![1.0, 1.0]);
        assert_eq!(rule.delta, 1);
        assert_eq!(rule.ann_fn.as_deref(), Some("average"));
    }

    #[test]
    fn test_head_bound_without_annotation() {
        let mut d = descriptor();
        d.annotation = None;
        d.head.bound = Some((0.7, 1.0));
        let rule = DescriptorTranslator::default().translate(&d).unwrap();
        assert_eq!(rule.head_bound, Some((0.7, 1.0)));
    }

    #[test]
    fn test_bad_arity_rejected() {
        let mut d = descriptor();
        d.body.push(atom("between", &["a", "b", "c"]));
        let err = DescriptorTranslator::new("legacy").translate(&d).unwrap_err();
        assert_eq!(err.code(), "LEX_RULE_TRANSLATION");
        assert!(err.to_string().contains("legacy"));
    }

    #[test]
    fn test_invalid_native_rule_rejected() {
        let mut d = descriptor();
        d.weights = vec![1.0];
        let err = DescriptorTranslator::default().translate(&d).unwrap_err();
        assert_eq!(err.code(), "LEX_RULE_TRANSLATION");
    }

    #[test]
    fn test_translate_all_from_json() {
        let json = r#"[{
            "name": "r1",
            "head": {"predicate": "controls", "args": ["x", "y"]},
            "body": [{"predicate": "cites", "args": ["x", "y"], "bound": [0.5, 1.0]}],
            "static": true,
            "infer_edges": true
        }]"#;
        let foreign: Vec<ForeignRuleDescriptor> = serde_json::from_str(json).unwrap();
        let rules = DescriptorTranslator::default().translate_all(&foreign).unwrap();
        assert_eq!(rules[0].rule_type, RuleType::Edge);
        assert_eq!(rules[0].clauses[0].bound, (0.5, 1.0));
        assert!(rules[0].set_static);
        assert_eq!(rules[0].inferred_edge_label(), Some("controls"));
    }
}
