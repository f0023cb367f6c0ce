//! Fact store, trace and support paths

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::interval::Interval;

use super::statement::Statement;

/// Kind of a trace event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    /// A merged update was written
    Update,
    /// A write was dropped because the statement is static
    StaticSkip,
    /// An intersection-mode write contradicted the stored interval
    Inconsistency,
}

/// Ordered debug event recorded by the flush step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub timestep: u64,
    pub kind: TraceKind,
    pub statement: String,
    /// Rule ids whose updates were merged, ascending
    pub sources: Vec<String>,
    pub lower: f64,
    pub upper: f64,
}

/// One derivation of a fact: which rule fired on which grounding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportPath {
    pub timestep: u64,
    pub rule_id: String,
    pub assignment: BTreeMap<String, String>,
    /// Statements matched by the rule body
    pub evidence: Vec<String>,
    pub lower: f64,
    pub upper: f64,
}

/// A fact as emitted on the line-delimited stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    pub statement: String,
    pub lower: f64,
    pub upper: f64,
    #[serde(rename = "static")]
    pub is_static: bool,
}

/// The fact store of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interpretation {
    pub(super) facts: BTreeMap<String, Interval>,
    pub(super) trace: Vec<TraceEvent>,
    pub(super) supports: BTreeMap<String, Vec<SupportPath>>,
    /// Structured form of every declared key
    pub(super) statements: BTreeMap<String, Statement>,
}

impl Interpretation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally replaces the stored bounds.
    ///
    /// An existing fact keeps its previous-bounds snapshot; the static flag is
    /// sticky.
    pub fn set_fact(&mut self, statement: &str, interval: Interval) -> Interval {
        match self.facts.get_mut(statement) {
            Some(existing) => {
                existing.set_lower_upper(interval.lower(), interval.upper());
                if interval.is_static() {
                    existing.set_static(true);
                }
                *existing
            }
            None => {
                self.facts.insert(statement.to_string(), interval);
                interval
            }
        }
    }

    /// Intersects with the stored interval, or inserts when absent.
    pub fn upsert_fact_intersection(&mut self, statement: &str, interval: Interval) -> Interval {
        match self.facts.get_mut(statement) {
            Some(existing) => {
                let met = existing.intersection(&interval);
                existing.set_lower_upper(met.lower(), met.upper());
                if interval.is_static() {
                    existing.set_static(true);
                }
                *existing
            }
            None => {
                self.facts.insert(statement.to_string(), interval);
                interval
            }
        }
    }

    pub fn get_fact(&self, statement: &str) -> Option<&Interval> {
        self.facts.get(statement)
    }

    pub fn has_fact(&self, statement: &str) -> bool {
        self.facts.contains_key(statement)
    }

    /// Facts in statement order
    pub fn facts(&self) -> impl Iterator<Item = (&String, &Interval)> {
        self.facts.iter()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    pub fn supports(&self, statement: &str) -> &[SupportPath] {
        self.supports.get(statement).map_or(&[], Vec::as_slice)
    }

    pub fn record_trace(&mut self, event: TraceEvent) {
        self.trace.push(event);
    }

    pub fn add_support(&mut self, statement: &str, path: SupportPath) {
        self.supports
            .entry(statement.to_string())
            .or_default()
            .push(path);
    }

    /// Records the structured form of a key and returns the key.
    ///
    /// Keys are not reparsed: entity ids may contain `,` or `(`.
    pub fn declare(&mut self, statement: Statement) -> String {
        let key = statement.key();
        self.statements.entry(key.clone()).or_insert(statement);
        key
    }

    /// Structured form of a fact key; falls back to parsing undeclared keys
    pub fn statement(&self, key: &str) -> Option<Statement> {
        match self.statements.get(key) {
            Some(s) => Some(s.clone()),
            None => Statement::parse(key),
        }
    }

    /// Resets every non-static fact to `[0, 1]`, snapshotting its bounds.
    pub fn reset_non_static(&mut self) {
        for interval in self.facts.values_mut() {
            if !interval.is_static() {
                interval.reset();
            }
        }
    }
}
