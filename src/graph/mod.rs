//! Attributed graph snapshot for lexrule
//!
//! A directed graph whose nodes and edges carry free-form attribute maps.
//! The engine only reads it: labels are extracted once into the label index.
//!
//! Graphs are loaded from the node-link JSON interchange form:
//!
//! ```text
//! {"directed": true,
//!  "nodes": [{"id": "A"}, {"id": "B", "precedential": true}],
//!  "links": [{"source": "A", "target": "B", "cites": 1}]}
//! ```

mod errors;
mod graph;

pub use errors::{GraphError, GraphResult};
pub use graph::{Attributes, Graph};
