//! Head-group evaluation
//!
//! Assignments are grouped by the entities they bind to the head variables.
//! Each group is then checked clause by clause against its evidence.

use std::collections::{BTreeMap, BTreeSet};

use crate::grounder::Assignment;
use crate::interpretation::{Interpretation, Statement};
use crate::interval::Interval;
use crate::rules::{Clause, ClauseType, NativeRule, RuleType};
use crate::threshold::ClauseCounts;

/// Entity ids bound to the head variables, in head order
pub(super) type HeadKey = Vec<String>;

/// One matched body statement
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Evidence {
    pub statement: String,
    pub interval: Interval,
    /// Present only as a graph label, not in the interpretation
    pub graph_only: bool,
}

/// Result of checking one head group
#[derive(Debug, Clone, PartialEq)]
pub(super) enum GroupOutcome {
    /// Clause `clause` failed its threshold
    Rejected { clause: usize },
    Accepted {
        /// Satisfied intervals per clause, `[0, 1]` when none
        annotations: Vec<Vec<Interval>>,
        evidence: Vec<Evidence>,
    },
}

/// Value of `var` under `a`; an unbound variable reads as a constant.
fn bound_value<'a>(a: &'a Assignment, var: &'a str) -> &'a str {
    a.get(var).map_or(var, String::as_str)
}

pub(super) fn head_key(rule: &NativeRule, a: &Assignment) -> HeadKey {
    rule.head_variables
        .iter()
        .map(|v| bound_value(a, v).to_string())
        .collect()
}

/// Wire key of the head statement for `key`
pub(super) fn head_statement(rule: &NativeRule, key: &HeadKey) -> Option<Statement> {
    match (rule.rule_type, key.as_slice()) {
        (RuleType::Node, [n]) => Some(Statement::node(&rule.target_label, n)),
        (RuleType::Edge, [u, v]) => Some(Statement::edge(&rule.target_label, u, v)),
        _ => None,
    }
}

/// Groups assignments by head key, ascending
pub(super) fn group_by_head<'a>(
    rule: &NativeRule,
    assignments: &'a [Assignment],
) -> BTreeMap<HeadKey, Vec<&'a Assignment>> {
    let mut groups: BTreeMap<HeadKey, Vec<&Assignment>> = BTreeMap::new();
    for a in assignments {
        groups.entry(head_key(rule, a)).or_default().push(a);
    }
    groups
}

fn clause_statement(clause: &Clause, a: &Assignment) -> Option<String> {
    match (clause.ctype, clause.variables.as_slice()) {
        (ClauseType::Node, [x]) => Some(Statement::node(&clause.label, bound_value(a, x)).key()),
        (ClauseType::Edge, [x, y]) => Some(
            Statement::edge(&clause.label, bound_value(a, x), bound_value(a, y)).key(),
        ),
        _ => None,
    }
}

fn lookup(interp: &Interpretation, statement: String) -> Evidence {
    match interp.get_fact(&statement) {
        Some(fact) => Evidence {
            statement,
            interval: *fact,
            graph_only: false,
        },
        None => Evidence {
            statement,
            interval: Interval::truth(),
            graph_only: true,
        },
    }
}

/// Checks every clause of `rule` for one head group.
///
/// A match is satisfied when its evidence lies within the clause bound and
/// available when its evidence is informative. Comparison clauses never
/// match and never reject.
pub(super) fn evaluate_group(
    rule: &NativeRule,
    group: &[&Assignment],
    interp: &Interpretation,
) -> GroupOutcome {
    let mut annotations = Vec::with_capacity(rule.clauses.len());
    let mut evidence = Vec::new();

    for (i, clause) in rule.clauses.iter().enumerate() {
        if clause.ctype == ClauseType::Comparison {
            annotations.push(vec![Interval::vacuous()]);
            continue;
        }

        let matches: BTreeSet<String> = group
            .iter()
            .filter_map(|a| clause_statement(clause, a))
            .collect();

        let mut counts = ClauseCounts {
            satisfied: 0,
            total: matches.len(),
            available: Some(0),
        };
        let mut intervals = Vec::new();
        let (lo, hi) = clause.bound;

        for statement in matches {
            let found = lookup(interp, statement);
            if !found.interval.is_vacuous() {
                counts.available = counts.available.map(|n| n + 1);
            }
            if found.interval.within(lo, hi) {
                counts.satisfied += 1;
                intervals.push(found.interval);
                evidence.push(found);
            }
        }

        if !counts.evaluate(&rule.threshold_for(i)) {
            return GroupOutcome::Rejected { clause: i };
        }
        if intervals.is_empty() {
            intervals.push(Interval::vacuous());
        }
        annotations.push(intervals);
    }

    GroupOutcome::Accepted {
        annotations,
        evidence,
    }
}
