//! Exported views of an interpretation

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use super::interpretation::{FactRecord, Interpretation};
use super::statement::Statement;

/// Which sections an export carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportProfile {
    /// Facts only
    #[default]
    Default,
    /// Facts, support paths and trace
    Audit,
}

/// Label-name filter applied to an export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redaction {
    pub labels_blocklist: BTreeSet<String>,
}

impl Redaction {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels_blocklist: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the statement's label is blocked.
    pub fn blocks(&self, statement: &str) -> bool {
        self.labels_blocklist.contains(Statement::label_of(statement))
    }
}

impl Interpretation {
    /// `{facts, supports, trace}` view with every section present.
    pub fn to_json(&self) -> Value {
        self.build_view(ExportProfile::Audit, &Redaction::default())
    }

    /// Profile-shaped, redacted view.
    pub fn export(&self, profile: ExportProfile, redaction: &Redaction) -> Value {
        self.build_view(profile, redaction)
    }

    /// One JSON object per line, sorted by statement.
    pub fn fact_stream(&self) -> String {
        self.fact_stream_filtered(&Redaction::default())
    }

    /// `fact_stream` without the facts `redaction` blocks.
    pub fn fact_stream_filtered(&self, redaction: &Redaction) -> String {
        let mut out = String::new();
        for (statement, interval) in &self.facts {
            if redaction.blocks(statement) {
                continue;
            }
            let record = FactRecord {
                statement: statement.clone(),
                lower: interval.lower(),
                upper: interval.upper(),
                is_static: interval.is_static(),
            };
            // FactRecord has only plain fields; serialization cannot fail
            if let Ok(line) = serde_json::to_string(&record) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    /// SHA-256 hex digest of the canonical `to_json()` string.
    pub fn fingerprint(&self) -> String {
        let canonical = self.to_json().to_string();
        let digest = Sha256::digest(canonical.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    fn build_view(&self, profile: ExportProfile, redaction: &Redaction) -> Value {
        let mut facts = Map::new();
        for (statement, interval) in &self.facts {
            if redaction.blocks(statement) {
                continue;
            }
            facts.insert(statement.clone(), json!([interval.lower(), interval.upper()]));
        }

        let mut view = Map::new();
        view.insert("facts".to_string(), Value::Object(facts));

        if profile == ExportProfile::Audit {
            let mut supports = Map::new();
            for (statement, paths) in &self.supports {
                if redaction.blocks(statement) {
                    continue;
                }
                supports.insert(statement.clone(), json!(paths));
            }
            let trace: Vec<Value> = self
                .trace
                .iter()
                .filter(|e| !redaction.blocks(&e.statement))
                .map(|e| json!(e))
                .collect();
            view.insert("supports".to_string(), Value::Object(supports));
            view.insert("trace".to_string(), Value::Array(trace));
        }

        Value::Object(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpretation::{TraceEvent, TraceKind};
    use crate::interval::Interval;

    fn sample() -> Interpretation {
        let mut interp = Interpretation::new();
        interp.set_fact("claim(A)", Interval::closed(0.6, 1.0));
        interp.set_fact("privileged(A,B)", Interval::closed(1.0, 1.0));
        interp.record_trace(TraceEvent {
            timestep: 0,
            kind: TraceKind::Update,
            statement: "privileged(A,B)".into(),
            sources: vec!["r1".into()],
            lower: 1.0,
            upper: 1.0,
        });
        interp
    }

    #[test]
    fn test_default_profile_facts_only() {
        let view = sample().export(ExportProfile::Default, &Redaction::default());
        let obj = view.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(view["facts"]["claim(A)"], json!([0.6, 1.0]));
    }

    #[test]
    fn test_audit_profile_sections() {
        let view = sample().export(ExportProfile::Audit, &Redaction::default());
        assert!(view["supports"].is_object());
        assert_eq!(view["trace"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_redaction_by_label() {
        let redaction = Redaction::new(["privileged"]);
        let view = sample().export(ExportProfile::Audit, &redaction);
        assert!(view["facts"].get("privileged(A,B)").is_none());
        assert!(view["facts"].get("claim(A)").is_some());
        assert!(view["trace"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_redaction_is_exact_label_match() {
        let redaction = Redaction::new(["claim"]);
        let mut interp = sample();
        interp.set_fact("claimant(A)", Interval::truth());
        let view = interp.export(ExportProfile::Default, &redaction);
        assert!(view["facts"].get("claim(A)").is_none());
        assert!(view["facts"].get("claimant(A)").is_some());
    }

    #[test]
    fn test_fact_stream_sorted_lines() {
        let stream = sample().fact_stream();
        let lines: Vec<&str> = stream.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["statement"], "claim(A)");
        assert_eq!(first["static"], false);
    }

    #[test]
    fn test_fact_stream_filtered() {
        let stream = sample().fact_stream_filtered(&Redaction::new(["privileged"]));
        assert_eq!(stream.lines().count(), 1);
        assert!(stream.contains("\"statement\":\"claim(A)\""));
        assert!(!stream.contains("privileged"));
    }

    #[test]
    fn test_fingerprint_stable() {
        let a = sample();
        let b = sample();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let mut c = sample();
        c.set_fact("claim(A)", Interval::closed(0.5, 1.0));
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
