//! Clause, threshold and rule value types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{RuleError, RuleResult};

/// Head bound used when a rule names neither `ann_fn` nor `head_bound`.
pub const DEFAULT_HEAD_BOUND: (f64, f64) = (1.0, 1.0);

/// What a clause matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseType {
    /// Node label, one variable
    Node,
    /// Edge label, two variables
    Edge,
    /// Attribute comparison; never binds variables
    Comparison,
}

impl ClauseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseType::Node => "node",
            ClauseType::Edge => "edge",
            ClauseType::Comparison => "comparison",
        }
    }
}

/// One body condition of a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub ctype: ClauseType,
    pub label: String,
    pub variables: Vec<String>,
    #[serde(default = "unit_bound")]
    pub bound: (f64, f64),
    #[serde(default)]
    pub operator: Option<String>,
}

fn unit_bound() -> (f64, f64) {
    (0.0, 1.0)
}

impl Clause {
    /// Node clause `label(var)` with bound `[0, 1]`
    pub fn node(label: impl Into<String>, var: impl Into<String>) -> Self {
        Self {
            ctype: ClauseType::Node,
            label: label.into(),
            variables: vec![var.into()],
            bound: unit_bound(),
            operator: None,
        }
    }

    /// Edge clause `label(src, dst)` with bound `[0, 1]`
    pub fn edge(label: impl Into<String>, src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            ctype: ClauseType::Edge,
            label: label.into(),
            variables: vec![src.into(), dst.into()],
            bound: unit_bound(),
            operator: None,
        }
    }

    /// Comparison clause over the given variables
    pub fn comparison(
        label: impl Into<String>,
        variables: Vec<String>,
        operator: impl Into<String>,
    ) -> Self {
        Self {
            ctype: ClauseType::Comparison,
            label: label.into(),
            variables,
            bound: unit_bound(),
            operator: Some(operator.into()),
        }
    }

    /// Sets the satisfaction bound
    pub fn with_bound(mut self, lower: f64, upper: f64) -> Self {
        self.bound = (lower, upper);
        self
    }

    /// Number of variables the clause type requires, if fixed
    pub fn expected_arity(&self) -> Option<usize> {
        match self.ctype {
            ClauseType::Node => Some(1),
            ClauseType::Edge => Some(2),
            ClauseType::Comparison => None,
        }
    }
}

/// Threshold comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quantifier {
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "=")]
    Eq,
}

impl Quantifier {
    pub fn symbol(&self) -> &'static str {
        match self {
            Quantifier::Ge => ">=",
            Quantifier::Gt => ">",
            Quantifier::Le => "<=",
            Quantifier::Lt => "<",
            Quantifier::Eq => "=",
        }
    }

    /// Parses `>=`, `>`, `<=`, `<`, `=` (and `==`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            ">=" => Some(Quantifier::Ge),
            ">" => Some(Quantifier::Gt),
            "<=" => Some(Quantifier::Le),
            "<" => Some(Quantifier::Lt),
            "=" | "==" => Some(Quantifier::Eq),
            _ => None,
        }
    }

    /// Applies the comparator as `value <op> thresh`
    pub fn compare(&self, value: f64, thresh: f64) -> bool {
        match self {
            Quantifier::Ge => value >= thresh,
            Quantifier::Gt => value > thresh,
            Quantifier::Le => value <= thresh,
            Quantifier::Lt => value < thresh,
            Quantifier::Eq => value == thresh,
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Whether a threshold counts matches or a percentage of the base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    Number,
    Percent,
}

/// Denominator used for the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdBase {
    Total,
    Available,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantifierType {
    pub mode: ThresholdMode,
    pub base: ThresholdBase,
}

/// Clause satisfaction threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSpec {
    pub quantifier: Quantifier,
    pub quantifier_type: QuantifierType,
    pub thresh: f64,
}

impl ThresholdSpec {
    pub fn new(quantifier: Quantifier, mode: ThresholdMode, base: ThresholdBase, thresh: f64) -> Self {
        Self {
            quantifier,
            quantifier_type: QuantifierType { mode, base },
            thresh,
        }
    }

    /// `number/total >= n`
    pub fn at_least(n: f64) -> Self {
        Self::new(Quantifier::Ge, ThresholdMode::Number, ThresholdBase::Total, n)
    }

    /// `percent/<base> <quantifier> pct`
    pub fn percent(quantifier: Quantifier, base: ThresholdBase, pct: f64) -> Self {
        Self::new(quantifier, ThresholdMode::Percent, base, pct)
    }
}

impl Default for ThresholdSpec {
    fn default() -> Self {
        Self::at_least(1.0)
    }
}

/// Whether a rule concludes a node fact or an edge fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Node,
    Edge,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Node => "node",
            RuleType::Edge => "edge",
        }
    }

    /// Head arity for this rule type
    pub fn head_arity(&self) -> usize {
        match self {
            RuleType::Node => 1,
            RuleType::Edge => 2,
        }
    }
}

/// A rule in the engine's native representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeRule {
    pub id: String,
    pub rule_type: RuleType,
    pub target_label: String,
    pub head_variables: Vec<String>,
    /// Timestep offset at which conclusions take effect
    #[serde(default)]
    pub delta: u32,
    #[serde(default)]
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub thresholds: Vec<ThresholdSpec>,
    #[serde(default)]
    pub head_bound: Option<(f64, f64)>,
    #[serde(default)]
    pub ann_fn: Option<String>,
    #[serde(default)]
    pub weights: Vec<f64>,
    #[serde(default)]
    pub infer_edges: bool,
    #[serde(default)]
    pub infer_edge_label: Option<String>,
    #[serde(default)]
    pub set_static: bool,
    /// Free-form metadata supplied by rule builders
    #[serde(default)]
    pub qualifiers: BTreeMap<String, String>,
}

impl NativeRule {
    /// Creates a node rule `target_label(var)` with no body
    pub fn node(id: impl Into<String>, target_label: impl Into<String>, var: impl Into<String>) -> Self {
        Self::with_head(id, RuleType::Node, target_label, vec![var.into()])
    }

    /// Creates an edge rule `target_label(src, dst)` with no body
    pub fn edge(
        id: impl Into<String>,
        target_label: impl Into<String>,
        src: impl Into<String>,
        dst: impl Into<String>,
    ) -> Self {
        Self::with_head(id, RuleType::Edge, target_label, vec![src.into(), dst.into()])
    }

    /// Creates a rule with an explicit head
    pub fn with_head(
        id: impl Into<String>,
        rule_type: RuleType,
        target_label: impl Into<String>,
        head_variables: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rule_type,
            target_label: target_label.into(),
            head_variables,
            delta: 0,
            clauses: Vec::new(),
            thresholds: Vec::new(),
            head_bound: None,
            ann_fn: None,
            weights: Vec::new(),
            infer_edges: false,
            infer_edge_label: None,
            set_static: false,
            qualifiers: BTreeMap::new(),
        }
    }

    pub fn with_clause(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn with_threshold(mut self, threshold: ThresholdSpec) -> Self {
        self.thresholds.push(threshold);
        self
    }

    pub fn with_ann_fn(mut self, name: impl Into<String>, weights: Vec<f64>) -> Self {
        self.ann_fn = Some(name.into());
        self.weights = weights;
        self
    }

    pub fn with_head_bound(mut self, lower: f64, upper: f64) -> Self {
        self.head_bound = Some((lower, upper));
        self
    }

    pub fn with_delta(mut self, delta: u32) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_static(mut self, set_static: bool) -> Self {
        self.set_static = set_static;
        self
    }

    /// Also writes the conclusion onto an edge labeled `label`
    pub fn with_inferred_edge(mut self, label: impl Into<String>) -> Self {
        self.infer_edges = true;
        self.infer_edge_label = Some(label.into());
        self
    }

    pub fn with_qualifier(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.qualifiers.insert(key.into(), value.into());
        self
    }

    /// Checks structural consistency.
    pub fn validate(&self) -> RuleResult<()> {
        let expected = self.rule_type.head_arity();
        if self.head_variables.len() != expected {
            return Err(RuleError::HeadArity {
                rule: self.id.clone(),
                rule_type: self.rule_type.as_str().to_string(),
                expected,
                actual: self.head_variables.len(),
            });
        }

        if self.ann_fn.is_some() && self.head_bound.is_some() {
            return Err(RuleError::HeadConflict(self.id.clone()));
        }

        if !self.thresholds.is_empty() && self.thresholds.len() != self.clauses.len() {
            return Err(RuleError::ThresholdCount {
                rule: self.id.clone(),
                clauses: self.clauses.len(),
                actual: self.thresholds.len(),
            });
        }

        if self.ann_fn.is_some() && self.weights.len() != self.clauses.len() {
            return Err(RuleError::WeightCount {
                rule: self.id.clone(),
                clauses: self.clauses.len(),
                actual: self.weights.len(),
            });
        }

        for clause in &self.clauses {
            if let Some(arity) = clause.expected_arity() {
                if clause.variables.len() != arity {
                    return Err(RuleError::ClauseArity {
                        rule: self.id.clone(),
                        label: clause.label.clone(),
                        expected: arity,
                        actual: clause.variables.len(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Fixed head bound, or `None` when an annotation function decides.
    pub fn fixed_head_bound(&self) -> Option<(f64, f64)> {
        match self.ann_fn {
            Some(_) => None,
            None => Some(self.head_bound.unwrap_or(DEFAULT_HEAD_BOUND)),
        }
    }

    /// Threshold for clause `i`, falling back to `number/total >= 1`.
    pub fn threshold_for(&self, i: usize) -> ThresholdSpec {
        self.thresholds.get(i).copied().unwrap_or_default()
    }

    /// Per-clause weights; `1.0` each when missing or misaligned.
    pub fn clause_weights(&self) -> Vec<f64> {
        if self.weights.len() == self.clauses.len() {
            self.weights.clone()
        } else {
            vec![1.0; self.clauses.len()]
        }
    }

    /// Label written for inferred edges, if the rule infers any.
    pub fn inferred_edge_label(&self) -> Option<&str> {
        if !self.infer_edges {
            return None;
        }
        Some(self.infer_edge_label.as_deref().unwrap_or(&self.target_label))
    }
}
