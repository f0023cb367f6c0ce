//! Engine and run configuration

use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationContext;
use crate::scheduler::UpdateMode;

use super::errors::{EngineError, EngineResult};

/// Engine behavior switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Aggregator used by rules that name `ann_fn = "default"`
    pub aggregator: String,
    /// Adjustment magnitude for the `*_alpha` aggregators
    pub alpha: f64,
    /// Accepted for compatibility; evaluation always takes the native path
    pub enable_jit: bool,
    /// Sort rules by `(rule_type, id)` before the first timestep
    pub deterministic: bool,
    /// `intersection` or `override`
    pub update_mode: String,
    /// Lock contradicted facts at `[0, 1]` and trace them
    pub inconsistency_check: bool,
    /// When false, non-static facts are reset before every flush after `t = 0`
    pub persistent: bool,
    /// Record support paths for every applied head
    pub atom_trace: bool,
    /// Include graph-only evidence in support paths
    pub save_graph_attrs_to_rule_trace: bool,
    /// When false, flush never writes
    pub emit_facts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            aggregator: "precedent_weighted".to_string(),
            alpha: 0.05,
            enable_jit: false,
            deterministic: true,
            update_mode: UpdateMode::Intersection.as_str().to_string(),
            inconsistency_check: false,
            persistent: true,
            atom_trace: false,
            save_graph_attrs_to_rule_trace: false,
            emit_facts: true,
        }
    }
}

impl EngineConfig {
    /// Checks field values that serde cannot. Aggregator registration is
    /// checked by `Engine::new`.
    pub fn validate(&self) -> EngineResult<()> {
        self.parsed_update_mode()?;
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(EngineError::InvalidAlpha(self.alpha));
        }
        Ok(())
    }

    pub fn parsed_update_mode(&self) -> EngineResult<UpdateMode> {
        self.update_mode
            .parse()
            .map_err(EngineError::InvalidUpdateMode)
    }

    pub fn annotation_context(&self) -> AnnotationContext {
        AnnotationContext { alpha: self.alpha }
    }
}

/// Loop bounds for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Last timestep, or `-1` for no bound
    pub tmax: i64,
    /// Converge when at most this many facts changed; `-1` disables
    pub convergence_threshold: i64,
    /// Converge when no bound moved more than this; `-1` disables
    pub convergence_bound_threshold: f64,
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tmax: 1,
            convergence_threshold: -1,
            convergence_bound_threshold: -1.0,
            verbose: false,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.tmax < -1 {
            return Err(EngineError::InvalidTmax(self.tmax));
        }
        Ok(())
    }

    /// Upper timestep bound, `None` when unbounded
    pub fn last_timestep(&self) -> Option<u64> {
        u64::try_from(self.tmax).ok()
    }
}
