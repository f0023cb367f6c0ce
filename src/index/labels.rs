//! Label → entity indices
//!
//! # API
//!
//! - `LabelIndex::build(graph, predicate)` - Extract labels from a snapshot
//! - `node_count(label)` / `edge_count(label)` - Cardinality estimates for join ordering
//! - `nodes(label)` / `edges(label)` - Ordered scans
//! - `out_neighbors(label, u)` / `in_neighbors(label, v)` - Adjacency expansion

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::Graph;

use super::predicate::LabelPredicate;

/// label → sorted node ids
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeLabelIndex {
    by_label: BTreeMap<String, BTreeSet<String>>,
}

impl NodeLabelIndex {
    pub fn insert(&mut self, label: &str, node: &str) {
        self.by_label
            .entry(label.to_string())
            .or_default()
            .insert(node.to_string());
    }

    pub fn count(&self, label: &str) -> usize {
        self.by_label.get(label).map_or(0, BTreeSet::len)
    }

    pub fn contains(&self, label: &str, node: &str) -> bool {
        self.by_label
            .get(label)
            .map_or(false, |set| set.contains(node))
    }

    /// Nodes carrying `label`, ascending
    pub fn members<'a>(&'a self, label: &str) -> impl Iterator<Item = &'a String> + 'a {
        self.by_label.get(label).into_iter().flatten()
    }
}

type Adjacency = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// label → sorted `(u, v)` pairs, plus per-label adjacency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeLabelIndex {
    by_label: BTreeMap<String, BTreeSet<(String, String)>>,
    out_adj: Adjacency,
    in_adj: Adjacency,
}

impl EdgeLabelIndex {
    pub fn insert(&mut self, label: &str, src: &str, dst: &str) {
        let inserted = self
            .by_label
            .entry(label.to_string())
            .or_default()
            .insert((src.to_string(), dst.to_string()));
        if !inserted {
            return;
        }
        self.out_adj
            .entry(label.to_string())
            .or_default()
            .entry(src.to_string())
            .or_default()
            .insert(dst.to_string());
        self.in_adj
            .entry(label.to_string())
            .or_default()
            .entry(dst.to_string())
            .or_default()
            .insert(src.to_string());
    }

    pub fn count(&self, label: &str) -> usize {
        self.by_label.get(label).map_or(0, BTreeSet::len)
    }

    pub fn contains(&self, label: &str, src: &str, dst: &str) -> bool {
        self.by_label
            .get(label)
            .map_or(false, |set| set.contains(&(src.to_string(), dst.to_string())))
    }

    /// Edges carrying `label`, ascending by `(u, v)`
    pub fn members<'a>(&'a self, label: &str) -> impl Iterator<Item = &'a (String, String)> + 'a {
        self.by_label.get(label).into_iter().flatten()
    }

    /// Targets `v` with `label(u, v)`, ascending
    pub fn out_neighbors<'a>(&'a self, label: &str, src: &str) -> impl Iterator<Item = &'a String> + 'a {
        self.out_adj
            .get(label)
            .and_then(|adj| adj.get(src))
            .into_iter()
            .flatten()
    }

    /// Sources `u` with `label(u, v)`, ascending
    pub fn in_neighbors<'a>(&'a self, label: &str, dst: &str) -> impl Iterator<Item = &'a String> + 'a {
        self.in_adj
            .get(label)
            .and_then(|adj| adj.get(dst))
            .into_iter()
            .flatten()
    }
}

/// Summary counts for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub node_labels: usize,
    pub edge_labels: usize,
    pub node_entries: usize,
    pub edge_entries: usize,
}

/// Node and edge label indices over one graph snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelIndex {
    nodes: NodeLabelIndex,
    edges: EdgeLabelIndex,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds indices from a graph snapshot.
    ///
    /// Every attribute the predicate accepts registers its entity under the
    /// attribute name. Traversal follows the graph's ordered maps.
    pub fn build<P: LabelPredicate + ?Sized>(graph: &Graph, predicate: &P) -> Self {
        let mut index = Self::new();

        for (id, attrs) in graph.nodes() {
            for (name, value) in attrs {
                if predicate.is_label_present(value) {
                    index.nodes.insert(name, id);
                }
            }
        }

        for ((src, dst), attrs) in graph.edges() {
            for (name, value) in attrs {
                if predicate.is_label_present(value) {
                    index.edges.insert(name, src, dst);
                }
            }
        }

        index
    }

    pub fn insert_node_label(&mut self, label: &str, node: &str) {
        self.nodes.insert(label, node);
    }

    pub fn insert_edge_label(&mut self, label: &str, src: &str, dst: &str) {
        self.edges.insert(label, src, dst);
    }

    pub fn node_index(&self) -> &NodeLabelIndex {
        &self.nodes
    }

    pub fn edge_index(&self) -> &EdgeLabelIndex {
        &self.edges
    }

    pub fn node_count(&self, label: &str) -> usize {
        self.nodes.count(label)
    }

    pub fn edge_count(&self, label: &str) -> usize {
        self.edges.count(label)
    }

    pub fn has_node(&self, label: &str, node: &str) -> bool {
        self.nodes.contains(label, node)
    }

    pub fn has_edge(&self, label: &str, src: &str, dst: &str) -> bool {
        self.edges.contains(label, src, dst)
    }

    pub fn nodes<'a>(&'a self, label: &str) -> impl Iterator<Item = &'a String> + 'a {
        self.nodes.members(label)
    }

    pub fn edges<'a>(&'a self, label: &str) -> impl Iterator<Item = &'a (String, String)> + 'a {
        self.edges.members(label)
    }

    pub fn out_neighbors<'a>(&'a self, label: &str, src: &str) -> impl Iterator<Item = &'a String> + 'a {
        self.edges.out_neighbors(label, src)
    }

    pub fn in_neighbors<'a>(&'a self, label: &str, dst: &str) -> impl Iterator<Item = &'a String> + 'a {
        self.edges.in_neighbors(label, dst)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            node_labels: self.nodes.by_label.len(),
            edge_labels: self.edges.by_label.len(),
            node_entries: self.nodes.by_label.values().map(BTreeSet::len).sum(),
            edge_entries: self.edges.by_label.values().map(BTreeSet::len).sum(),
        }
    }
}
