//! Join plans
//!
//! A plan is immutable and holds no runtime state, only the clause order and
//! the access path chosen for each step.

use std::collections::BTreeSet;
use std::fmt;

use crate::index::LabelIndex;
use crate::rules::{Clause, ClauseType};

/// Access path for one join step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// Cross product with every node carrying the label
    ScanNodes,
    /// Keep assignments whose bound node carries the label
    FilterNodes,
    /// Cross product with every labeled edge
    ScanEdges,
    /// Keep assignments whose bound endpoints form a labeled edge
    FilterEdges,
    /// Source bound: expand through `out_neighbors`
    ExpandOut,
    /// Target bound: expand through `in_neighbors`
    ExpandIn,
}

impl JoinStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinStrategy::ScanNodes => "NODE_SCAN",
            JoinStrategy::FilterNodes => "NODE_FILTER",
            JoinStrategy::ScanEdges => "EDGE_SCAN",
            JoinStrategy::FilterEdges => "EDGE_FILTER",
            JoinStrategy::ExpandOut => "EDGE_EXPAND_OUT",
            JoinStrategy::ExpandIn => "EDGE_EXPAND_IN",
        }
    }
}

/// One step of a join plan
#[derive(Debug, Clone, PartialEq)]
pub struct JoinStep {
    /// Position of the clause in the rule body
    pub clause_index: usize,
    pub label: String,
    /// Estimated cardinality (label count in the index)
    pub estimate: usize,
    pub strategy: JoinStrategy,
}

/// Ordered join steps for one clause list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinPlan {
    pub steps: Vec<JoinStep>,
}

impl JoinPlan {
    /// Orders clauses by `(estimate, position)` and assigns each step its strategy.
    ///
    /// Comparison clauses and clauses with the wrong arity are left out.
    pub fn build(index: &LabelIndex, clauses: &[Clause]) -> Self {
        let mut candidates: Vec<(usize, usize)> = clauses
            .iter()
            .enumerate()
            .filter(|(_, c)| c.expected_arity() == Some(c.variables.len()))
            .map(|(i, c)| match c.ctype {
                ClauseType::Node => (index.node_count(&c.label), i),
                _ => (index.edge_count(&c.label), i),
            })
            .collect();
        candidates.sort();

        let mut bound: BTreeSet<&str> = BTreeSet::new();
        let mut steps = Vec::with_capacity(candidates.len());

        for (estimate, i) in candidates {
            let clause = &clauses[i];
            let strategy = match clause.ctype {
                ClauseType::Node => {
                    if bound.contains(clause.variables[0].as_str()) {
                        JoinStrategy::FilterNodes
                    } else {
                        JoinStrategy::ScanNodes
                    }
                }
                _ => {
                    let src = bound.contains(clause.variables[0].as_str());
                    let dst = bound.contains(clause.variables[1].as_str());
                    match (src, dst) {
                        (true, true) => JoinStrategy::FilterEdges,
                        (true, false) => JoinStrategy::ExpandOut,
                        (false, true) => JoinStrategy::ExpandIn,
                        (false, false) => JoinStrategy::ScanEdges,
                    }
                }
            };
            for var in &clause.variables {
                bound.insert(var.as_str());
            }
            steps.push(JoinStep {
                clause_index: i,
                label: clause.label.clone(),
                estimate,
                strategy,
            });
        }

        Self { steps }
    }

    /// Clause positions in join order
    pub fn order(&self) -> Vec<usize> {
        self.steps.iter().map(|s| s.clause_index).collect()
    }
}

impl fmt::Display for JoinPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, step) in self.steps.iter().enumerate() {
            if n > 0 {
                f.write_str(" -> ")?;
            }
            write!(
                f,
                "{}#{}:{}(~{})",
                step.strategy.as_str(),
                step.clause_index,
                step.label,
                step.estimate
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::index::TruthyPredicate;

    fn index() -> LabelIndex {
        let graph = Graph::new()
            .with_node("A", &["court"])
            .with_node("B", &["court", "precedential"])
            .with_node("C", &["court"])
            .with_edge("A", "B", &["cites"])
            .with_edge("B", "C", &["cites"])
            .with_edge("A", "C", &["cites"]);
        LabelIndex::build(&graph, &TruthyPredicate)
    }

    #[test]
    fn test_order_by_cardinality() {
        let clauses = vec![
            Clause::node("court", "x"),
            Clause::edge("cites", "x", "y"),
            Clause::node("precedential", "y"),
        ];
        let plan = JoinPlan::build(&index(), &clauses);
        assert_eq!(plan.order(), vec![2, 0, 1]);
        assert_eq!(plan.steps[0].strategy, JoinStrategy::ScanNodes);
        assert_eq!(plan.steps[1].strategy, JoinStrategy::ScanNodes);
        assert_eq!(plan.steps[2].strategy, JoinStrategy::FilterEdges);
    }

    #[test]
    fn test_ties_keep_position() {
        let clauses = vec![Clause::node("missing_b", "x"), Clause::node("missing_a", "y")];
        let plan = JoinPlan::build(&index(), &clauses);
        assert_eq!(plan.order(), vec![0, 1]);
    }

    #[test]
    fn test_expand_strategies() {
        let clauses = vec![
            Clause::node("precedential", "y"),
            Clause::edge("cites", "x", "y"),
        ];
        let plan = JoinPlan::build(&index(), &clauses);
        assert_eq!(plan.steps[1].strategy, JoinStrategy::ExpandIn);

        let clauses = vec![
            Clause::node("precedential", "x"),
            Clause::edge("cites", "x", "y"),
        ];
        let plan = JoinPlan::build(&index(), &clauses);
        assert_eq!(plan.steps[1].strategy, JoinStrategy::ExpandOut);
    }

    #[test]
    fn test_comparison_clauses_excluded() {
        let clauses = vec![
            Clause::comparison("year", vec!["x".into()], ">"),
            Clause::node("court", "x"),
        ];
        let plan = JoinPlan::build(&index(), &clauses);
        assert_eq!(plan.order(), vec![1]);
    }

    #[test]
    fn test_display() {
        let plan = JoinPlan::build(&index(), &[Clause::node("precedential", "y")]);
        assert_eq!(plan.to_string(), "NODE_SCAN#0:precedential(~1)");
    }
}
