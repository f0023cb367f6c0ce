//! Time-keyed update queue and flush

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::interpretation::{Interpretation, TraceEvent, TraceKind};
use crate::interval::Interval;

use super::arena::{StatementArena, StatementId, StaticSet};

/// How concurrent updates to one statement are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    #[default]
    Intersection,
    Override,
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Intersection => "intersection",
            UpdateMode::Override => "override",
        }
    }
}

impl FromStr for UpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intersection" => Ok(UpdateMode::Intersection),
            "override" => Ok(UpdateMode::Override),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending write to one statement
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledUpdate {
    pub statement: String,
    pub interval: Interval,
    /// `None` defers to the flush's default mode
    pub mode: Option<UpdateMode>,
    pub set_static: bool,
    /// Rule id, used as the override tie-break
    pub source: String,
}

/// Outcome of one flush
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlushStats {
    pub changed_count: usize,
    pub max_bound_delta: f64,
    pub applied: usize,
    pub static_skips: usize,
    pub inconsistencies: usize,
}

#[derive(Debug, Clone)]
struct Pending {
    id: StatementId,
    interval: Interval,
    mode: Option<UpdateMode>,
    set_static: bool,
    source: String,
}

/// Temporal scheduler
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    arena: StatementArena,
    statics: StaticSet,
    queue: BTreeMap<u64, Vec<Pending>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `update` for effective timestep `t`.
    pub fn schedule(&mut self, t: u64, update: ScheduledUpdate) {
        let id = self.arena.intern(&update.statement);
        self.queue.entry(t).or_default().push(Pending {
            id,
            interval: update.interval,
            mode: update.mode,
            set_static: update.set_static,
            source: update.source,
        });
    }

    /// Number of updates queued for `t`
    pub fn pending_at(&self, t: u64) -> usize {
        self.queue.get(&t).map_or(0, Vec::len)
    }

    /// True when any update is queued strictly after `t`
    pub fn has_pending_after(&self, t: u64) -> bool {
        self.queue.range(t.saturating_add(1)..).next().is_some()
    }

    pub fn is_static(&self, statement: &str) -> bool {
        self.arena
            .get(statement)
            .is_some_and(|id| self.statics.contains(id))
    }

    /// Merges all updates for `t` into `interp`.
    ///
    /// With `emit_facts` off this is a no-op: the queue and the
    /// interpretation are left untouched.
    pub fn flush(
        &mut self,
        t: u64,
        interp: &mut Interpretation,
        default_mode: UpdateMode,
        emit_facts: bool,
        inconsistency_check: bool,
    ) -> FlushStats {
        let mut stats = FlushStats::default();
        if !emit_facts {
            return stats;
        }
        let Some(pending) = self.queue.remove(&t) else {
            return stats;
        };

        let mut groups: BTreeMap<String, Vec<Pending>> = BTreeMap::new();
        for update in pending {
            let statement = match self.arena.resolve(update.id) {
                Some(s) => s.to_string(),
                None => continue,
            };
            groups.entry(statement).or_default().push(update);
        }

        for (statement, updates) in groups {
            let id = updates[0].id;
            let existing = interp.get_fact(&statement).copied();

            let locked = existing.is_some_and(|e| e.is_static())
                || (self.statics.contains(id) && existing.is_some());
            if locked {
                stats.static_skips += 1;
                interp.record_trace(trace_event(t, TraceKind::StaticSkip, &statement, &updates, None));
                continue;
            }

            let mode = resolve_mode(&updates, default_mode);
            let set_static = updates.iter().any(|u| u.set_static);
            let prev = existing.unwrap_or_else(Interval::vacuous);

            let applied = match mode {
                UpdateMode::Intersection => {
                    let merged = meet_all(&updates, set_static);
                    let contradicts = merged.is_none()
                        || merged.is_some_and(|m| existing.is_some_and(|e| e.is_disjoint(&m)));
                    if inconsistency_check && contradicts {
                        stats.inconsistencies += 1;
                        let neutral = interp.set_fact(&statement, Interval::closed_static(0.0, 1.0, true));
                        self.statics.insert(id);
                        interp.record_trace(trace_event(
                            t,
                            TraceKind::Inconsistency,
                            &statement,
                            &updates,
                            Some(&neutral),
                        ));
                        record_delta(&mut stats, &prev, &neutral);
                        continue;
                    }
                    match merged {
                        Some(m) => interp.upsert_fact_intersection(&statement, m),
                        None => interp.set_fact(&statement, Interval::closed_static(0.0, 1.0, set_static)),
                    }
                }
                UpdateMode::Override => {
                    let winner = narrowest(&updates);
                    let interval =
                        Interval::closed_static(winner.lower(), winner.upper(), set_static);
                    interp.set_fact(&statement, interval)
                }
            };

            if set_static {
                self.statics.insert(id);
            }
            stats.applied += 1;
            interp.record_trace(trace_event(t, TraceKind::Update, &statement, &updates, Some(&applied)));
            record_delta(&mut stats, &prev, &applied);
        }

        stats
    }
}

fn resolve_mode(updates: &[Pending], default_mode: UpdateMode) -> UpdateMode {
    let all_override = updates
        .iter()
        .all(|u| u.mode.unwrap_or(default_mode) == UpdateMode::Override);
    if all_override {
        UpdateMode::Override
    } else {
        UpdateMode::Intersection
    }
}

/// Meet of every candidate, or `None` on contradiction.
fn meet_all(updates: &[Pending], set_static: bool) -> Option<Interval> {
    let lower = updates
        .iter()
        .map(|u| u.interval.lower())
        .fold(0.0_f64, f64::max);
    let upper = updates
        .iter()
        .map(|u| u.interval.upper())
        .fold(1.0_f64, f64::min);
    if lower > upper {
        None
    } else {
        Some(Interval::closed_static(lower, upper, set_static))
    }
}

fn narrowest(updates: &[Pending]) -> Interval {
    let mut best = &updates[0];
    for candidate in &updates[1..] {
        if override_order(candidate, best) == Ordering::Less {
            best = candidate;
        }
    }
    best.interval
}

fn override_order(a: &Pending, b: &Pending) -> Ordering {
    a.interval
        .span()
        .total_cmp(&b.interval.span())
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.interval.lower().total_cmp(&b.interval.lower()))
        .then_with(|| a.interval.upper().total_cmp(&b.interval.upper()))
}

fn record_delta(stats: &mut FlushStats, prev: &Interval, cur: &Interval) {
    let delta = cur.bound_delta(prev);
    if delta > 0.0 {
        stats.changed_count += 1;
    }
    stats.max_bound_delta = stats.max_bound_delta.max(delta);
}

fn trace_event(
    t: u64,
    kind: TraceKind,
    statement: &str,
    updates: &[Pending],
    applied: Option<&Interval>,
) -> TraceEvent {
    let mut sources: Vec<String> = updates.iter().map(|u| u.source.clone()).collect();
    sources.sort();
    sources.dedup();
    let (lower, upper) = applied.map_or((0.0, 1.0), Interval::bounds);
    TraceEvent {
        timestep: t,
        kind,
        statement: statement.to_string(),
        sources,
        lower,
        upper,
    }
}
