//! Lifecycle events emitted by lexrule

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Inputs
    ConfigLoaded,
    GraphLoaded,
    RulesLoaded,
    /// A DSL line or token could not be parsed and was skipped
    DslLineSkipped,

    // Run lifecycle
    RunBegin,
    IndexBuilt,
    TimestepComplete,
    Converged,
    RunComplete,

    // Degraded paths
    /// A rule failed validation and was skipped for the timestep
    RuleSkipped,
    /// An aggregator failed; the head fell back to `[0,1]`
    AggregatorFailed,
    /// An intersection write contradicted the stored fact
    Inconsistency,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::GraphLoaded => "GRAPH_LOADED",
            Event::RulesLoaded => "RULES_LOADED",
            Event::DslLineSkipped => "DSL_LINE_SKIPPED",
            Event::RunBegin => "RUN_BEGIN",
            Event::IndexBuilt => "INDEX_BUILT",
            Event::TimestepComplete => "TIMESTEP_COMPLETE",
            Event::Converged => "CONVERGED",
            Event::RunComplete => "RUN_COMPLETE",
            Event::RuleSkipped => "RULE_SKIPPED",
            Event::AggregatorFailed => "AGGREGATOR_FAILED",
            Event::Inconsistency => "INCONSISTENCY",
        }
    }

    /// True for events that report degraded results
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            Event::DslLineSkipped | Event::RuleSkipped | Event::AggregatorFailed | Event::Inconsistency
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
