//! Ground statement keys

use std::fmt;

/// A ground fact key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Statement {
    Node { label: String, node: String },
    Edge { label: String, src: String, dst: String },
}

impl Statement {
    pub fn node(label: impl Into<String>, node: impl Into<String>) -> Self {
        Statement::Node {
            label: label.into(),
            node: node.into(),
        }
    }

    pub fn edge(label: impl Into<String>, src: impl Into<String>, dst: impl Into<String>) -> Self {
        Statement::Edge {
            label: label.into(),
            src: src.into(),
            dst: dst.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Statement::Node { label, .. } | Statement::Edge { label, .. } => label,
        }
    }

    /// The wire key, `Label(arg)` or `Label(arg1,arg2)`
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Parses a wire key. Returns `None` for anything that is not exactly
    /// one label followed by one or two parenthesized arguments.
    pub fn parse(key: &str) -> Option<Self> {
        let open = key.find('(')?;
        let inner = key.get(open + 1..)?.strip_suffix(')')?;
        let label = &key[..open];
        if label.is_empty() || inner.contains('(') || inner.contains(')') {
            return None;
        }
        let args: Vec<&str> = inner.split(',').collect();
        match args.as_slice() {
            [n] if !n.is_empty() => Some(Statement::node(label, *n)),
            [u, v] if !u.is_empty() && !v.is_empty() => Some(Statement::edge(label, *u, *v)),
            _ => None,
        }
    }

    /// Label part of a wire key: the text before the first `(`
    pub fn label_of(key: &str) -> &str {
        key.split('(').next().unwrap_or(key)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Node { label, node } => write!(f, "{}({})", label, node),
            Statement::Edge { label, src, dst } => write!(f, "{}({},{})", label, src, dst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert_eq!(Statement::node("support_for_claim", "A").key(), "support_for_claim(A)");
        assert_eq!(Statement::edge("cites", "A", "B").key(), "cites(A,B)");
    }

    #[test]
    fn test_parse_round_trip() {
        for key in ["precedential(B)", "cites(A,B)"] {
            assert_eq!(Statement::parse(key).unwrap().key(), key);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for key in ["cites", "(A)", "cites(A", "cites()", "cites(A,B,C)", "cites(A,)", "f(g(x))"] {
            assert!(Statement::parse(key).is_none(), "accepted {}", key);
        }
    }

    #[test]
    fn test_label_of() {
        assert_eq!(Statement::label_of("cites(A,B)"), "cites");
        assert_eq!(Statement::label_of("plain"), "plain");
    }
}
