//! Directed graph with per-node and per-edge attribute maps

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::errors::{GraphError, GraphResult};

/// Attribute bag attached to a node or edge
pub type Attributes = BTreeMap<String, Value>;

/// Immutable-by-convention graph snapshot.
///
/// Nodes and edges are kept in `BTreeMap`s so every traversal is ordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<String, Attributes>,
    edges: BTreeMap<(String, String), Attributes>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, merging attributes into an existing one
    pub fn add_node(&mut self, id: impl Into<String>, attrs: Attributes) {
        self.nodes.entry(id.into()).or_default().extend(attrs);
    }

    /// Adds a directed edge, declaring missing endpoints and merging attributes
    pub fn add_edge(&mut self, src: impl Into<String>, dst: impl Into<String>, attrs: Attributes) {
        let src = src.into();
        let dst = dst.into();
        self.nodes.entry(src.clone()).or_default();
        self.nodes.entry(dst.clone()).or_default();
        self.edges.entry((src, dst)).or_default().extend(attrs);
    }

    /// Builder helper: node with boolean labels set to `true`
    pub fn with_node(mut self, id: &str, labels: &[&str]) -> Self {
        self.add_node(id, flags(labels));
        self
    }

    /// Builder helper: edge with boolean labels set to `true`
    pub fn with_edge(mut self, src: &str, dst: &str, labels: &[&str]) -> Self {
        self.add_edge(src, dst, flags(labels));
        self
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&String, &Attributes)> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&(String, String), &Attributes)> {
        self.edges.iter()
    }

    pub fn node_attributes(&self, id: &str) -> Option<&Attributes> {
        self.nodes.get(id)
    }

    pub fn edge_attributes(&self, src: &str, dst: &str) -> Option<&Attributes> {
        self.edges.get(&(src.to_string(), dst.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Loads a node-link JSON file
    pub fn load(path: &Path) -> GraphResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| GraphError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_node_link_json(&content)
    }

    /// Parses a node-link JSON document.
    ///
    /// Edges are read from `links` (or `edges`). Numeric ids are rendered
    /// with their JSON text. Reserved keys (`id`, `source`, `target`, `key`)
    /// are not treated as attributes.
    pub fn from_node_link_json(content: &str) -> GraphResult<Self> {
        let doc: Value = serde_json::from_str(content)?;
        let obj = doc
            .as_object()
            .ok_or_else(|| GraphError::Malformed("document must be an object".into()))?;

        if obj.get("directed").and_then(Value::as_bool) == Some(false) {
            return Err(GraphError::Malformed("undirected graphs are not supported".into()));
        }

        let mut graph = Graph::new();

        if let Some(nodes) = obj.get("nodes") {
            let nodes = nodes
                .as_array()
                .ok_or_else(|| GraphError::Malformed("'nodes' must be an array".into()))?;
            for node in nodes {
                let node = node
                    .as_object()
                    .ok_or_else(|| GraphError::Malformed("node entries must be objects".into()))?;
                let id = entity_id(node.get("id"))?
                    .ok_or_else(|| GraphError::Malformed("node is missing 'id'".into()))?;
                graph.add_node(id, attributes(node, &["id"]));
            }
        }

        let links = obj.get("links").or_else(|| obj.get("edges"));
        if let Some(links) = links {
            let links = links
                .as_array()
                .ok_or_else(|| GraphError::Malformed("'links' must be an array".into()))?;
            for link in links {
                let link = link
                    .as_object()
                    .ok_or_else(|| GraphError::Malformed("link entries must be objects".into()))?;
                let src = entity_id(link.get("source"))?
                    .ok_or_else(|| GraphError::Malformed("link is missing 'source'".into()))?;
                let dst = entity_id(link.get("target"))?
                    .ok_or_else(|| GraphError::Malformed("link is missing 'target'".into()))?;
                graph.add_edge(src, dst, attributes(link, &["source", "target", "key"]));
            }
        }

        Ok(graph)
    }
}

/// Reads an id, rejecting text that cannot appear inside a statement key
fn entity_id(value: Option<&Value>) -> GraphResult<Option<String>> {
    let id = match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Ok(None),
    };
    if id.is_empty() || id.chars().any(|c| c.is_whitespace() || matches!(c, ',' | '(' | ')')) {
        return Err(GraphError::Malformed(format!(
            "entity id '{}' is empty or contains whitespace, ',', '(' or ')'",
            id
        )));
    }
    Ok(Some(id))
}

fn attributes(obj: &Map<String, Value>, reserved: &[&str]) -> Attributes {
    obj.iter()
        .filter(|(k, _)| !reserved.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn flags(labels: &[&str]) -> Attributes {
    labels
        .iter()
        .map(|l| (l.to_string(), Value::Bool(true)))
        .collect()
}
