//! Fixed-point engine

use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::annotation::AnnotationRegistry;
use crate::graph::Graph;
use crate::grounder::Grounder;
use crate::index::{LabelIndex, LabelPredicate, TruthyPredicate};
use crate::interpretation::{Interpretation, Statement, SupportPath};
use crate::interval::Interval;
use crate::observability::{log_event, log_step, Event, MetricsRegistry, Timer};
use crate::rules::{NativeRule, RuleType};
use crate::scheduler::{FlushStats, ScheduledUpdate, Scheduler, UpdateMode};

use super::config::{EngineConfig, RunConfig};
use super::errors::{EngineError, EngineResult};
use super::evaluate::{evaluate_group, group_by_head, head_statement, GroupOutcome, HeadKey};

/// Rules naming this aggregator use `EngineConfig::aggregator`
pub const DEFAULT_AGGREGATOR: &str = "default";

/// Forward-chaining engine over one graph snapshot per run
pub struct Engine {
    config: EngineConfig,
    update_mode: UpdateMode,
    registry: AnnotationRegistry,
    predicate: Box<dyn LabelPredicate + Send + Sync>,
    metrics: MetricsRegistry,
}

impl Engine {
    /// Validates `config` against `registry`.
    pub fn new(config: EngineConfig, registry: AnnotationRegistry) -> EngineResult<Self> {
        config.validate()?;
        let update_mode = config.parsed_update_mode()?;
        if !registry.contains(&config.aggregator) {
            return Err(EngineError::UnknownAggregator(config.aggregator.clone()));
        }
        Ok(Self {
            config,
            update_mode,
            registry,
            predicate: Box::new(TruthyPredicate),
            metrics: MetricsRegistry::new(),
        })
    }

    /// Replaces the label predicate used when indexing graph attributes.
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: LabelPredicate + Send + Sync + 'static,
    {
        self.predicate = Box::new(predicate);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &AnnotationRegistry {
        &self.registry
    }

    /// Counters accumulated over every run of this engine
    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Structural check of every rule, plus aggregator registration.
    ///
    /// Returns the first failure. Runs do not require this; a run skips
    /// invalid rules instead.
    pub fn validate_rules(&self, rules: &[NativeRule]) -> EngineResult<()> {
        for rule in rules {
            rule.validate()?;
            if let Some(name) = rule.ann_fn.as_deref() {
                if !self.registry.contains(self.resolve_aggregator(name)) {
                    return Err(EngineError::RuleAggregator {
                        rule: rule.id.clone(),
                        name: name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Runs to convergence or `tmax`.
    pub fn run(
        &self,
        graph: &Graph,
        rules: &[NativeRule],
        tmax: i64,
        convergence_threshold: i64,
        convergence_bound_threshold: f64,
        verbose: bool,
    ) -> EngineResult<Interpretation> {
        self.run_with(
            graph,
            rules,
            &RunConfig {
                tmax,
                convergence_threshold,
                convergence_bound_threshold,
                verbose,
            },
        )
    }

    pub fn run_with(
        &self,
        graph: &Graph,
        rules: &[NativeRule],
        run: &RunConfig,
    ) -> EngineResult<Interpretation> {
        run.validate()?;

        let run_id = Uuid::new_v4().to_string();
        let timer = Timer::new();
        log_event(
            Event::RunBegin,
            &[
                ("run_id", &run_id),
                ("rules", &rules.len().to_string()),
                ("tmax", &run.tmax.to_string()),
                ("update_mode", self.update_mode.as_str()),
                ("path", if self.config.enable_jit { "native_fallback" } else { "native" }),
            ],
        );

        let base = LabelIndex::build(graph, self.predicate.as_ref());
        let stats = base.stats();
        log_event(
            Event::IndexBuilt,
            &[
                ("run_id", &run_id),
                ("node_labels", &stats.node_labels.to_string()),
                ("node_entries", &stats.node_entries.to_string()),
                ("edge_labels", &stats.edge_labels.to_string()),
                ("edge_entries", &stats.edge_entries.to_string()),
            ],
        );

        let mut ordered: Vec<&NativeRule> = rules.iter().collect();
        if self.config.deterministic {
            ordered.sort_by(|a, b| {
                (a.rule_type.as_str(), a.id.as_str()).cmp(&(b.rule_type.as_str(), b.id.as_str()))
            });
        }

        let mut interp = Interpretation::new();
        let mut scheduler = Scheduler::new();
        let last = run.last_timestep();
        let mut t: u64 = 0;
        let mut converged = false;

        loop {
            let index = overlay(&base, &interp);
            let grounder = Grounder::new(&index);
            for rule in &ordered {
                self.apply_rule(rule, t, &grounder, &mut interp, &mut scheduler, &run_id);
            }

            let flush = self.flush(t, &mut interp, &mut scheduler, &run_id);
            self.metrics.increment_timesteps();
            log_step(
                Event::TimestepComplete,
                run.verbose,
                &[
                    ("run_id", &run_id),
                    ("t", &t.to_string()),
                    ("changed", &flush.changed_count.to_string()),
                    ("max_bound_delta", &flush.max_bound_delta.to_string()),
                    ("facts", &interp.len().to_string()),
                ],
            );

            if has_converged(run, &flush, scheduler.has_pending_after(t)) {
                converged = true;
                log_event(Event::Converged, &[("run_id", &run_id), ("t", &t.to_string())]);
                break;
            }
            if last == Some(t) {
                break;
            }
            t += 1;
        }

        log_event(
            Event::RunComplete,
            &[
                ("run_id", &run_id),
                ("timesteps", &(t + 1).to_string()),
                ("converged", if converged { "true" } else { "false" }),
                ("facts", &interp.len().to_string()),
                ("elapsed_ms", &timer.elapsed_ms()),
            ],
        );
        Ok(interp)
    }

    fn resolve_aggregator<'a>(&'a self, name: &'a str) -> &'a str {
        if name == DEFAULT_AGGREGATOR {
            &self.config.aggregator
        } else {
            name
        }
    }

    fn apply_rule(
        &self,
        rule: &NativeRule,
        t: u64,
        grounder: &Grounder<'_>,
        interp: &mut Interpretation,
        scheduler: &mut Scheduler,
        run_id: &str,
    ) {
        if let Err(e) = rule.validate() {
            self.metrics.increment_rules_skipped();
            log_event(
                Event::RuleSkipped,
                &[
                    ("run_id", run_id),
                    ("rule", &rule.id),
                    ("t", &t.to_string()),
                    ("code", e.code()),
                    ("reason", &e.to_string()),
                ],
            );
            return;
        }
        self.metrics.increment_rules_evaluated();

        let assignments = grounder.ground_rule(rule);
        self.metrics.add_groundings(assignments.len() as u64);
        let effective = t + u64::from(rule.delta);

        for (head, group) in group_by_head(rule, &assignments) {
            let Some(head_fact) = head_statement(rule, &head) else {
                continue;
            };
            let (annotations, evidence) = match evaluate_group(rule, &group, interp) {
                GroupOutcome::Rejected { .. } => {
                    self.metrics.increment_heads_rejected();
                    continue;
                }
                GroupOutcome::Accepted { annotations, evidence } => (annotations, evidence),
            };

            let statement = interp.declare(head_fact.clone());
            let interval = self.head_interval(rule, &annotations, &statement, t, run_id);
            self.schedule(scheduler, effective, rule, &statement, interval);

            if let Some(edge) = inferred_edge(rule, &head) {
                if edge != head_fact {
                    let edge = interp.declare(edge);
                    self.schedule(scheduler, effective, rule, &edge, interval);
                }
            }

            if self.config.atom_trace {
                let keep_graph = self.config.save_graph_attrs_to_rule_trace;
                let path = SupportPath {
                    timestep: t,
                    rule_id: rule.id.clone(),
                    assignment: head_binding(rule, &head),
                    evidence: evidence
                        .into_iter()
                        .filter(|e| keep_graph || !e.graph_only)
                        .map(|e| e.statement)
                        .collect(),
                    lower: interval.lower(),
                    upper: interval.upper(),
                };
                interp.add_support(&statement, path);
            }
        }
    }

    fn head_interval(
        &self,
        rule: &NativeRule,
        annotations: &[Vec<Interval>],
        statement: &str,
        t: u64,
        run_id: &str,
    ) -> Interval {
        if let Some((lower, upper)) = rule.fixed_head_bound() {
            return Interval::closed(lower, upper);
        }
        let name = self.resolve_aggregator(rule.ann_fn.as_deref().unwrap_or(DEFAULT_AGGREGATOR));
        let ctx = self.config.annotation_context();
        match self.registry.apply(name, annotations, &rule.clause_weights(), &ctx) {
            Ok(interval) => interval,
            Err(e) => {
                self.metrics.increment_aggregator_failures();
                log_event(
                    Event::AggregatorFailed,
                    &[
                        ("run_id", run_id),
                        ("rule", &rule.id),
                        ("statement", statement),
                        ("t", &t.to_string()),
                        ("code", e.code()),
                        ("reason", &e.to_string()),
                    ],
                );
                Interval::vacuous()
            }
        }
    }

    fn schedule(
        &self,
        scheduler: &mut Scheduler,
        t: u64,
        rule: &NativeRule,
        statement: &str,
        interval: Interval,
    ) {
        self.metrics.increment_updates_scheduled();
        scheduler.schedule(
            t,
            ScheduledUpdate {
                statement: statement.to_string(),
                interval,
                mode: Some(self.update_mode),
                set_static: rule.set_static,
                source: rule.id.clone(),
            },
        );
    }

    fn flush(
        &self,
        t: u64,
        interp: &mut Interpretation,
        scheduler: &mut Scheduler,
        run_id: &str,
    ) -> FlushStats {
        if !self.config.emit_facts {
            return scheduler.flush(t, interp, self.update_mode, false, false);
        }

        let before = (!self.config.persistent && t > 0).then(|| {
            let snapshot: BTreeMap<String, Interval> =
                interp.facts().map(|(k, v)| (k.clone(), *v)).collect();
            interp.reset_non_static();
            snapshot
        });

        let mut stats = scheduler.flush(
            t,
            interp,
            self.update_mode,
            true,
            self.config.inconsistency_check,
        );
        self.metrics.add_updates_applied(stats.applied as u64);
        self.metrics.add_static_skips(stats.static_skips as u64);
        self.metrics.add_inconsistencies(stats.inconsistencies as u64);
        if stats.inconsistencies > 0 {
            log_event(
                Event::Inconsistency,
                &[
                    ("run_id", run_id),
                    ("t", &t.to_string()),
                    ("count", &stats.inconsistencies.to_string()),
                ],
            );
        }

        if let Some(before) = before {
            let (changed, max_delta) = drift_since(&before, interp);
            stats.changed_count = changed;
            stats.max_bound_delta = max_delta;
        }
        stats
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}

/// Base index plus every statement recorded in `interp`
fn overlay(base: &LabelIndex, interp: &Interpretation) -> LabelIndex {
    let mut index = base.clone();
    for (key, _) in interp.facts() {
        match interp.statement(key) {
            Some(Statement::Node { label, node }) => index.insert_node_label(&label, &node),
            Some(Statement::Edge { label, src, dst }) => index.insert_edge_label(&label, &src, &dst),
            None => {}
        }
    }
    index
}

fn inferred_edge(rule: &NativeRule, head: &HeadKey) -> Option<Statement> {
    let label = rule.inferred_edge_label()?;
    match (rule.rule_type, head.as_slice()) {
        (RuleType::Edge, [u, v]) => Some(Statement::edge(label, u, v)),
        _ => None,
    }
}

fn head_binding(rule: &NativeRule, head: &HeadKey) -> BTreeMap<String, String> {
    rule.head_variables
        .iter()
        .cloned()
        .zip(head.iter().cloned())
        .collect()
}

/// Changed count and largest movement of every fact against `before`;
/// facts absent from `before` are measured from `[0, 1]`.
fn drift_since(before: &BTreeMap<String, Interval>, interp: &Interpretation) -> (usize, f64) {
    let mut changed = 0;
    let mut max_delta: f64 = 0.0;
    for (key, cur) in interp.facts() {
        let prev = before.get(key).copied().unwrap_or_else(Interval::vacuous);
        let delta = cur.bound_delta(&prev);
        if delta > 0.0 {
            changed += 1;
        }
        max_delta = max_delta.max(delta);
    }
    (changed, max_delta)
}

/// Convergence test, in priority order: bound threshold, change-count
/// threshold, then quiescence.
fn has_converged(run: &RunConfig, flush: &FlushStats, pending_after: bool) -> bool {
    if run.convergence_bound_threshold != -1.0 {
        flush.max_bound_delta <= run.convergence_bound_threshold
    } else if run.convergence_threshold != -1 {
        (flush.changed_count as i64) <= run.convergence_threshold
    } else {
        flush.changed_count == 0 && !pending_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Clause;

    fn engine(config: EngineConfig) -> Engine {
        Engine::new(config, AnnotationRegistry::with_builtins()).unwrap()
    }

    fn graph() -> Graph {
        Graph::new()
            .with_node("A", &["court"])
            .with_node("B", &["court", "precedential"])
            .with_edge("A", "B", &["cites"])
    }

    #[test]
    fn test_new_rejects_unknown_aggregator() {
        let config = EngineConfig {
            aggregator: "median".into(),
            ..EngineConfig::default()
        };
        let err = Engine::new(config, AnnotationRegistry::with_builtins()).unwrap_err();
        assert_eq!(err, EngineError::UnknownAggregator("median".into()));
    }

    #[test]
    fn test_validate_rules() {
        let e = engine(EngineConfig::default());
        let good = NativeRule::node("r1", "cited", "y")
            .with_clause(Clause::edge("cites", "x", "y"))
            .with_ann_fn("default", vec![1.0]);
        assert!(e.validate_rules(&[good.clone()]).is_ok());

        let unknown = good.clone().with_ann_fn("median", vec![1.0]);
        assert!(matches!(
            e.validate_rules(&[unknown]),
            Err(EngineError::RuleAggregator { .. })
        ));

        let bad_arity = NativeRule::with_head("r2", RuleType::Node, "x", vec![]);
        assert!(matches!(e.validate_rules(&[bad_arity]), Err(EngineError::Rule(_))));
    }

    #[test]
    fn test_invalid_rule_skipped_during_run() {
        let e = engine(EngineConfig::default());
        let rules = vec![
            NativeRule::with_head("bad", RuleType::Edge, "x", vec!["a".into()]),
            NativeRule::node("good", "cited", "y").with_clause(Clause::edge("cites", "x", "y")),
        ];
        let interp = e.run(&graph(), &rules, 0, -1, -1.0, false).unwrap();
        assert_eq!(interp.get_fact("cited(B)").unwrap().bounds(), (1.0, 1.0));
        assert_eq!(e.metrics().snapshot().rules_skipped, 1);
    }

    #[test]
    fn test_rejects_bad_tmax() {
        let e = engine(EngineConfig::default());
        assert_eq!(
            e.run(&graph(), &[], -2, -1, -1.0, false).unwrap_err(),
            EngineError::InvalidTmax(-2)
        );
    }

    #[test]
    fn test_aggregator_failure_degrades() {
        let mut registry = AnnotationRegistry::with_builtins();
        registry
            .register("broken", |_: &[Vec<Interval>], _: &[f64], _: &crate::annotation::AnnotationContext| {
                Err(crate::annotation::AnnotationError::NonFiniteAlpha(f64::NAN))
            })
            .unwrap();
        let e = Engine::new(EngineConfig::default(), registry).unwrap();
        let rules = vec![NativeRule::node("r1", "cited", "y")
            .with_clause(Clause::edge("cites", "x", "y"))
            .with_ann_fn("broken", vec![1.0])];

        let interp = e.run(&graph(), &rules, 0, -1, -1.0, false).unwrap();
        assert!(interp.get_fact("cited(B)").unwrap().is_vacuous());
        assert_eq!(e.metrics().snapshot().aggregator_failures, 1);
    }

    #[test]
    fn test_delta_defers_conclusion() {
        let e = engine(EngineConfig::default());
        let rules = vec![NativeRule::node("r1", "cited", "y")
            .with_clause(Clause::edge("cites", "x", "y"))
            .with_delta(2)];

        let early = e.run(&graph(), &rules, 1, -1, -1.0, false).unwrap();
        assert!(!early.has_fact("cited(B)"));

        let late = e.run(&graph(), &rules, 2, -1, -1.0, false).unwrap();
        assert!(late.has_fact("cited(B)"));
    }

    #[test]
    fn test_inferred_edge_scheduled() {
        let e = engine(EngineConfig::default());
        let rules = vec![NativeRule::edge("r1", "relies_on", "x", "y")
            .with_clause(Clause::edge("cites", "x", "y"))
            .with_clause(Clause::node("precedential", "y"))
            .with_inferred_edge("authority")];
        let interp = e.run(&graph(), &rules, 0, -1, -1.0, false).unwrap();
        assert!(interp.has_fact("relies_on(A,B)"));
        assert!(interp.has_fact("authority(A,B)"));
    }

    #[test]
    fn test_emit_facts_off() {
        let e = engine(EngineConfig {
            emit_facts: false,
            ..EngineConfig::default()
        });
        let rules = vec![NativeRule::node("r1", "cited", "y").with_clause(Clause::edge("cites", "x", "y"))];
        let interp = e.run(&graph(), &rules, 3, -1, -1.0, false).unwrap();
        assert!(interp.is_empty());
    }

    #[test]
    fn test_atom_trace_support_paths() {
        let rules = vec![NativeRule::node("r1", "cited", "y").with_clause(Clause::edge("cites", "x", "y"))];

        let e = engine(EngineConfig {
            atom_trace: true,
            save_graph_attrs_to_rule_trace: true,
            ..EngineConfig::default()
        });
        let interp = e.run(&graph(), &rules, 0, -1, -1.0, false).unwrap();
        let paths = interp.supports("cited(B)");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].rule_id, "r1");
        assert_eq!(paths[0].evidence, vec!["cites(A,B)".to_string()]);
        assert_eq!(paths[0].assignment["y"], "B");

        let e = engine(EngineConfig {
            atom_trace: true,
            ..EngineConfig::default()
        });
        let interp = e.run(&graph(), &rules, 0, -1, -1.0, false).unwrap();
        assert!(interp.supports("cited(B)")[0].evidence.is_empty());
    }

    #[test]
    fn test_non_persistent_rederived_fact_survives_reset() {
        let e = engine(EngineConfig {
            persistent: false,
            ..EngineConfig::default()
        });
        // a head-only rule fires every timestep
        let rules = vec![NativeRule::node("seed", "claim", "A")];
        let interp = e.run(&graph(), &rules, 3, -1, -1.0, false).unwrap();
        assert_eq!(interp.get_fact("claim(A)").unwrap().bounds(), (1.0, 1.0));
        assert_eq!(e.metrics().snapshot().timesteps, 2);
    }

    #[test]
    fn test_chain_over_punctuated_ids() {
        let e = engine(EngineConfig::default());
        let graph = Graph::new()
            .with_node("Plain", &["court"])
            .with_node("Smith, J.", &["court"])
            .with_node("Doe (2020)", &["court"]);
        let rules = vec![
            NativeRule::node("flag", "flagged", "x").with_clause(Clause::node("court", "x")),
            NativeRule::node("confirm", "confirmed", "x").with_clause(Clause::node("flagged", "x")),
        ];

        let interp = e.run(&graph, &rules, 3, -1, -1.0, false).unwrap();
        for id in ["Plain", "Smith, J.", "Doe (2020)"] {
            let key = Statement::node("confirmed", id).key();
            assert!(interp.has_fact(&key), "missing {}", key);
        }
        assert!(!interp.has_fact("flagged(Smith)"));
    }

    #[test]
    fn test_drift_since_counts_resets() {
        let mut before = BTreeMap::new();
        before.insert("claim(A)".to_string(), Interval::closed(0.6, 0.9));
        let mut interp = Interpretation::new();
        interp.set_fact("claim(A)", Interval::vacuous());
        interp.set_fact("claim(B)", Interval::truth());

        let (changed, max_delta) = drift_since(&before, &interp);
        assert_eq!(changed, 2);
        assert!((max_delta - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_convergence_priority() {
        let run = RunConfig {
            convergence_bound_threshold: 0.5,
            convergence_threshold: 0,
            ..RunConfig::default()
        };
        let flush = FlushStats {
            changed_count: 3,
            max_bound_delta: 0.25,
            ..FlushStats::default()
        };
        assert!(has_converged(&run, &flush, true));

        let run = RunConfig {
            convergence_threshold: 3,
            ..RunConfig::default()
        };
        assert!(has_converged(&run, &flush, true));

        let quiet = FlushStats::default();
        assert!(has_converged(&RunConfig::default(), &quiet, false));
        assert!(!has_converged(&RunConfig::default(), &quiet, true));
    }
}
