//! Line-oriented rule compiler
//!
//! ```text
//! # comment
//! rule <ID>: <Head>(x[,y]) :- <Label>(v[,w])[:[l,u]], ... ; directive; ...
//! rule <ID>: <Head>(x[,y])
//! ```
//!
//! Directives: `ann=<fn>`, `weights=w1,w2,..`, `delta=<int>`,
//! `set_static=<bool>`, `infer_edges=<Label>`, `bound=[l,u]`.

use regex::Regex;

use crate::observability::{log_event, Event};
use crate::rules::{Clause, NativeRule, RuleType};

use super::errors::{DslError, DslResult};

/// A skipped line or fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based line number
    pub line: usize,
    pub fragment: String,
    pub error: DslError,
    /// False when the whole line was dropped
    pub rule_kept: bool,
}

/// Output of one compilation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compilation {
    pub rules: Vec<NativeRule>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiles rule DSL text into validated `NativeRule`s
#[derive(Debug, Clone)]
pub struct RuleCompiler {
    line: Regex,
    atom: Regex,
    clause: Regex,
    interval: Regex,
}

impl RuleCompiler {
    pub fn new() -> DslResult<Self> {
        Ok(Self {
            line: Regex::new(r"^rule\s+([A-Za-z0-9_.\-]+)\s*:\s*(.+)$")?,
            atom: Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*\(([^()]*)\)$")?,
            clause: Regex::new(
                r"([A-Za-z_][A-Za-z0-9_]*)\s*\(([^()]*)\)(?:\s*:\s*\[([^\[\]]*)\])?",
            )?,
            interval: Regex::new(r"^\[\s*([^,\[\]]+?)\s*,\s*([^,\[\]]+?)\s*\]$")?,
        })
    }

    /// Compiles every line of `source`.
    ///
    /// Blank lines and `#` comments are ignored. A line with a malformed head
    /// or clause, or failing validation, is skipped whole. A malformed
    /// directive is skipped alone. Both are logged at WARN and listed in
    /// `diagnostics`.
    pub fn compile(&self, source: &str) -> Compilation {
        let mut out = Compilation::default();

        for (i, raw) in source.lines().enumerate() {
            let line_no = i + 1;
            let text = strip_comment(raw).trim();
            if text.is_empty() {
                continue;
            }

            let mut fragments = Vec::new();
            let result = self
                .compile_line(text, &mut fragments)
                .and_then(|rule| rule.validate().map(|_| rule).map_err(DslError::from));

            let kept = result.is_ok();
            for (fragment, error) in fragments {
                report(&mut out, line_no, fragment, error, kept);
            }
            match result {
                Ok(rule) => out.rules.push(rule),
                Err(error) => report(&mut out, line_no, text.to_string(), error, false),
            }
        }

        out
    }

    fn compile_line(&self, text: &str, fragments: &mut Vec<(String, DslError)>) -> DslResult<NativeRule> {
        let caps = self
            .line
            .captures(text)
            .ok_or_else(|| DslError::NotARule(text.to_string()))?;
        let id = &caps[1];
        let rest = &caps[2];

        let mut sections = rest.split(';');
        let statement = sections.next().unwrap_or_default().trim();
        let (head, body) = match statement.split_once(":-") {
            Some((h, b)) => (h.trim(), Some(b.trim())),
            None => (statement, None),
        };

        let mut rule = self.parse_head(id, head)?;
        if let Some(body) = body {
            rule.clauses = self.parse_body(body)?;
        }

        for directive in sections.map(str::trim).filter(|d| !d.is_empty()) {
            if let Err(e) = self.apply_directive(&mut rule, directive) {
                fragments.push((directive.to_string(), e));
            }
        }

        if rule.ann_fn.is_some() && rule.weights.is_empty() {
            rule.weights = vec![1.0; rule.clauses.len()];
        }
        Ok(rule)
    }

    fn parse_head(&self, id: &str, head: &str) -> DslResult<NativeRule> {
        let caps = self
            .atom
            .captures(head)
            .ok_or_else(|| DslError::MalformedHead(head.to_string()))?;
        let vars = split_args(&caps[2]).ok_or_else(|| DslError::MalformedHead(head.to_string()))?;
        let rule_type = match vars.len() {
            1 => RuleType::Node,
            2 => RuleType::Edge,
            n => return Err(DslError::HeadArity(n)),
        };
        Ok(NativeRule::with_head(id, rule_type, &caps[1], vars))
    }

    /// Every clause must parse; a dropped clause would widen the rule.
    fn parse_body(&self, body: &str) -> DslResult<Vec<Clause>> {
        let mut clauses = Vec::new();
        let mut cursor = 0;

        for caps in self.clause.captures_iter(body) {
            let Some(whole) = caps.get(0) else { continue };
            check_gap(&body[cursor..whole.start()])?;
            cursor = whole.end();
            clauses.push(self.parse_clause(&caps)?);
        }
        check_gap(&body[cursor..])?;

        if clauses.is_empty() {
            return Err(DslError::MalformedClause(body.to_string()));
        }
        Ok(clauses)
    }

    fn parse_clause(&self, caps: &regex::Captures<'_>) -> DslResult<Clause> {
        let label = &caps[1];
        let vars = split_args(&caps[2]).unwrap_or_default();
        let clause = match vars.as_slice() {
            [x] => Clause::node(label, x.as_str()),
            [x, y] => Clause::edge(label, x.as_str(), y.as_str()),
            _ => return Err(DslError::MalformedClause(caps[0].to_string())),
        };
        match caps.get(3) {
            Some(bound) => {
                let (lower, upper) = self
                    .parse_interval(&format!("[{}]", bound.as_str()))
                    .ok_or_else(|| DslError::MalformedClause(caps[0].to_string()))?;
                Ok(clause.with_bound(lower, upper))
            }
            None => Ok(clause),
        }
    }

    fn parse_interval(&self, text: &str) -> Option<(f64, f64)> {
        let caps = self.interval.captures(text.trim())?;
        let lower: f64 = caps[1].parse().ok()?;
        let upper: f64 = caps[2].parse().ok()?;
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        (in_range(lower) && in_range(upper) && lower <= upper).then_some((lower, upper))
    }

    fn apply_directive(&self, rule: &mut NativeRule, directive: &str) -> DslResult<()> {
        let malformed = || DslError::MalformedDirective(directive.to_string());
        let (key, value) = directive.split_once('=').ok_or_else(malformed)?;
        let value = value.trim();

        match key.trim() {
            "ann" => {
                if value.is_empty() {
                    return Err(malformed());
                }
                rule.ann_fn = Some(value.to_string());
            }
            "weights" => {
                rule.weights = value
                    .split(',')
                    .map(|w| w.trim().parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| malformed())?;
            }
            "delta" => rule.delta = value.parse().map_err(|_| malformed())?,
            "set_static" => rule.set_static = parse_bool(value).ok_or_else(malformed)?,
            "infer_edges" => {
                if !is_identifier(value) {
                    return Err(malformed());
                }
                rule.infer_edges = true;
                rule.infer_edge_label = Some(value.to_string());
            }
            "bound" => {
                let (lower, upper) = self.parse_interval(value).ok_or_else(malformed)?;
                rule.head_bound = Some((lower, upper));
            }
            other => return Err(DslError::UnknownDirective(other.to_string())),
        }
        Ok(())
    }
}

fn report(out: &mut Compilation, line: usize, fragment: String, error: DslError, rule_kept: bool) {
    log_event(
        Event::DslLineSkipped,
        &[
            ("line", &line.to_string()),
            ("fragment", &fragment),
            ("code", error.code()),
            ("reason", &error.to_string()),
        ],
    );
    out.diagnostics.push(Diagnostic {
        line,
        fragment,
        error,
        rule_kept,
    });
}

/// Text between clause matches must be separators only.
fn check_gap(gap: &str) -> DslResult<()> {
    match gap.split(',').map(str::trim).find(|p| !p.is_empty()) {
        Some(piece) => Err(DslError::MalformedClause(piece.to_string())),
        None => Ok(()),
    }
}

fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or_default()
}

/// Comma-separated identifiers; `None` when any is empty or invalid.
fn split_args(args: &str) -> Option<Vec<String>> {
    args.split(',')
        .map(str::trim)
        .map(|a| is_identifier(a).then(|| a.to_string()))
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ClauseType;

    fn compile(source: &str) -> Compilation {
        RuleCompiler::new().unwrap().compile(source)
    }

    #[test]
    fn test_full_rule() {
        let out = compile(
            "rule support: support_for_claim(x) :- controlling(x), cites(x,y); \
             ann=legal_burden_civil_051; weights=2,1; delta=1; set_static=true",
        );
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        let rule = &out.rules[0];
        assert_eq!(rule.id, "support");
        assert_eq!(rule.rule_type, RuleType::Node);
        assert_eq!(rule.target_label, "support_for_claim");
        assert_eq!(rule.head_variables, vec!["x".to_string()]);
        assert_eq!(rule.clauses.len(), 2);
        assert_eq!(rule.clauses[0].ctype, ClauseType::Node);
        assert_eq!(rule.clauses[1].ctype, ClauseType::Edge);
        assert_eq!(rule.clauses[1].variables, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(rule.ann_fn.as_deref(), Some("legal_burden_civil_051"));
        assert_eq!(rule.weights, vec![2.0, 1.0]);
        assert_eq!(rule.delta, 1);
        assert!(rule.set_static);
    }

    #[test]
    fn test_head_only_rule() {
        let out = compile("rule seed: claim(A)");
        assert_eq!(out.rules.len(), 1);
        assert!(out.rules[0].clauses.is_empty());
        assert_eq!(out.rules[0].fixed_head_bound(), Some((1.0, 1.0)));
    }

    #[test]
    fn test_edge_head_and_extras() {
        let out = compile(
            "rule r2: relies_on(x,y) :- cites(x,y):[0.5,1], precedential(y); \
             infer_edges=authority; bound=[0.6,0.9]",
        );
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        let rule = &out.rules[0];
        assert_eq!(rule.rule_type, RuleType::Edge);
        assert_eq!(rule.clauses[0].bound, (0.5, 1.0));
        assert_eq!(rule.clauses[1].bound, (0.0, 1.0));
        assert_eq!(rule.inferred_edge_label(), Some("authority"));
        assert_eq!(rule.head_bound, Some((0.6, 0.9)));
    }

    #[test]
    fn test_directives_order_independent() {
        let a = compile("rule r: h(x) :- a(x); delta=2; ann=average; weights=1");
        let b = compile("rule r: h(x) :- a(x); weights=1; ann=average; delta=2");
        assert_eq!(a.rules, b.rules);
    }

    #[test]
    fn test_ann_without_weights_defaults_to_ones() {
        let out = compile("rule r: h(x) :- a(x), b(x); ann=average");
        assert_eq!(out.rules[0].weights, vec![1.0, 1.0]);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let out = compile("# header\n\n   \nrule r: h(x) :- a(x)  # trailing\n");
        assert_eq!(out.rules.len(), 1);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let out = compile(
            "this is not a rule\n\
             rule bad: h(x,y,z) :- a(x)\n\
             rule bad2: h( :- a(x)\n\
             rule good: h(x) :- a(x)",
        );
        assert_eq!(out.rules.len(), 1);
        assert_eq!(out.rules[0].id, "good");
        let lines: Vec<usize> = out.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
        assert!(out.diagnostics.iter().all(|d| !d.rule_kept));
        assert_eq!(out.diagnostics[1].error, DslError::HeadArity(3));
    }

    #[test]
    fn test_malformed_directives_skipped() {
        let out = compile("rule r: h(x) :- a(x), b(x); delta=soon; colour=blue");
        let rule = &out.rules[0];
        assert_eq!(rule.clauses.len(), 2);
        assert_eq!(rule.delta, 0);

        let codes: Vec<&str> = out.diagnostics.iter().map(|d| d.error.code()).collect();
        assert_eq!(codes, vec!["LEX_DSL_DIRECTIVE", "LEX_DSL_UNKNOWN_DIRECTIVE"]);
        assert!(out.diagnostics.iter().all(|d| d.rule_kept));
    }

    #[test]
    fn test_malformed_clause_drops_line() {
        for source in [
            "rule r: h(x) :- a(x), ???, b(x)",
            "rule r: h(x) :- a(x,y,z)",
            "rule r: h(x) :-",
        ] {
            let out = compile(source);
            assert!(out.rules.is_empty(), "kept {}", source);
            assert_eq!(out.diagnostics.len(), 1);
            assert_eq!(out.diagnostics[0].error.code(), "LEX_DSL_CLAUSE");
            assert!(!out.diagnostics[0].rule_kept);
        }
    }

    #[test]
    fn test_invalid_rule_rejected_by_validation() {
        let out = compile("rule r: h(x) :- a(x), b(x); ann=average; weights=1");
        assert!(out.rules.is_empty());
        assert_eq!(out.diagnostics[0].error.code(), "LEX_RULE_WEIGHT_COUNT");
    }

    #[test]
    fn test_ann_and_bound_conflict() {
        let out = compile("rule r: h(x) :- a(x); ann=average; bound=[1,1]");
        assert!(out.rules.is_empty());
        assert_eq!(out.diagnostics[0].error.code(), "LEX_RULE_HEAD_CONFLICT");
    }

    #[test]
    fn test_bad_clause_bound() {
        let out = compile("rule r: h(x) :- a(x):[0.9,0.1]");
        assert!(out.rules.is_empty());
        assert_eq!(out.diagnostics[0].error.code(), "LEX_DSL_CLAUSE");
        assert!(!out.diagnostics[0].rule_kept);
    }
}
