//! Content graph queries
//!
//! Queries provide read-only access to the materialized tables. Absence is returned as
//! `None` or an empty result; command-side callers turn it into typed failures.

mod content_graph;
mod content_subgraph;
mod node;

pub use content_graph::ContentGraph;
pub use content_subgraph::ContentSubgraph;
pub use node::{Node, Reference, VisibilityConstraints};
