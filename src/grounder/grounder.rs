//! Assignment production over a label index
//!
//! Executes a `JoinPlan` step by step, starting from a single empty
//! assignment.

use std::collections::BTreeMap;

use crate::index::LabelIndex;
use crate::rules::{Clause, NativeRule};

use super::plan::{JoinPlan, JoinStrategy};

/// variable → entity id
pub type Assignment = BTreeMap<String, String>;

/// Grounds rules against one label index
#[derive(Debug, Clone, Copy)]
pub struct Grounder<'a> {
    index: &'a LabelIndex,
}

impl<'a> Grounder<'a> {
    pub fn new(index: &'a LabelIndex) -> Self {
        Self { index }
    }

    /// Join plan for a rule body
    pub fn plan(&self, clauses: &[Clause]) -> JoinPlan {
        JoinPlan::build(self.index, clauses)
    }

    /// All assignments satisfying the rule's clause structure, sorted.
    pub fn ground_rule(&self, rule: &NativeRule) -> Vec<Assignment> {
        self.ground_clauses(&rule.clauses)
    }

    /// All assignments satisfying `clauses`, sorted and deduplicated.
    ///
    /// An empty clause list grounds to one empty assignment.
    pub fn ground_clauses(&self, clauses: &[Clause]) -> Vec<Assignment> {
        let plan = self.plan(clauses);
        let mut assignments = vec![Assignment::new()];

        for step in &plan.steps {
            let clause = &clauses[step.clause_index];
            assignments = self.apply_step(clause, step.strategy, assignments);
            if assignments.is_empty() {
                return Vec::new();
            }
        }

        assignments.sort();
        assignments.dedup();
        assignments
    }

    fn apply_step(
        &self,
        clause: &Clause,
        strategy: JoinStrategy,
        assignments: Vec<Assignment>,
    ) -> Vec<Assignment> {
        let label = clause.label.as_str();
        let x = clause.variables[0].as_str();
        let mut out = Vec::new();

        match strategy {
            JoinStrategy::FilterNodes => {
                out = assignments
                    .into_iter()
                    .filter(|a| a.get(x).map_or(false, |n| self.index.has_node(label, n)))
                    .collect();
            }
            JoinStrategy::ScanNodes => {
                for a in &assignments {
                    for node in self.index.nodes(label) {
                        out.push(extend(a, &[(x, node)]));
                    }
                }
            }
            JoinStrategy::FilterEdges => {
                let y = clause.variables[1].as_str();
                out = assignments
                    .into_iter()
                    .filter(|a| match (a.get(x), a.get(y)) {
                        (Some(u), Some(v)) => self.index.has_edge(label, u, v),
                        _ => false,
                    })
                    .collect();
            }
            JoinStrategy::ExpandOut => {
                let y = clause.variables[1].as_str();
                for a in &assignments {
                    if let Some(u) = a.get(x) {
                        for v in self.index.out_neighbors(label, u) {
                            out.push(extend(a, &[(y, v)]));
                        }
                    }
                }
            }
            JoinStrategy::ExpandIn => {
                let y = clause.variables[1].as_str();
                for a in &assignments {
                    if let Some(v) = a.get(y) {
                        for u in self.index.in_neighbors(label, v) {
                            out.push(extend(a, &[(x, u)]));
                        }
                    }
                }
            }
            JoinStrategy::ScanEdges => {
                let y = clause.variables[1].as_str();
                for a in &assignments {
                    for (u, v) in self.index.edges(label) {
                        if x == y {
                            if u == v {
                                out.push(extend(a, &[(x, u)]));
                            }
                        } else {
                            out.push(extend(a, &[(x, u), (y, v)]));
                        }
                    }
                }
            }
        }

        out
    }
}

fn extend(base: &Assignment, bindings: &[(&str, &String)]) -> Assignment {
    let mut a = base.clone();
    for (var, value) in bindings {
        a.insert((*var).to_string(), (*value).clone());
    }
    a
}
