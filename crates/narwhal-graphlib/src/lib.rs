#![forbid(unsafe_code)]

//! Weighted graph container used by `narwhal`.
//!
//! The graph plays the "data source" role for layout runs: ordered nodes with display
//! coordinates, weighted edges, and a teardown notification (`Graph::kill`, also fired on
//! drop). Shortest-path queries live in [`alg`].

mod graph;

pub use graph::alg;
pub use graph::{Edge, EdgeKey, Graph, GraphId, GraphOptions, Node, Point};
