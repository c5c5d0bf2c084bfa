//! Target-distance (`D`) and stress-weight (`W`) matrices.
//!
//! Both matrices are `N x N`, symmetric, and indexed by node insertion order. In `D`, an
//! off-diagonal `0` means "no target distance" (no edge in the maxent variant, unreachable in the
//! classic one); [`DistanceMatrix::target`] exposes that sentinel as an `Option`.

use crate::config::Variant;
use crate::error::{Error, Result};
use nalgebra::DMatrix;
use narwhal_graphlib::Graph;
use narwhal_graphlib::alg::{self, AstarOptions};

/// Weighted geodesic distances between nodes.
pub trait ShortestPathOracle {
    /// Length of the shortest undirected path, or `None` when unreachable.
    fn shortest_path_length(&self, from: &str, to: &str) -> Option<f64>;

    /// Distances from `from` to each of `targets`, in the same order.
    fn distances_from(&self, from: &str, targets: &[String]) -> Vec<Option<f64>> {
        targets
            .iter()
            .map(|to| self.shortest_path_length(from, to))
            .collect()
    }
}

impl ShortestPathOracle for Graph {
    fn shortest_path_length(&self, from: &str, to: &str) -> Option<f64> {
        alg::astar(self, from, to, &AstarOptions::default()).map(|p| p.path_length)
    }

    // One single-source sweep instead of a search per pair.
    fn distances_from(&self, from: &str, targets: &[String]) -> Vec<Option<f64>> {
        let all = alg::dijkstra(self, from, true);
        targets
            .iter()
            .map(|t| self.node_index(t).and_then(|ix| all[ix]))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix(DMatrix<f64>);

impl DistanceMatrix {
    pub fn zeros(n: usize) -> Self {
        Self(DMatrix::zeros(n, n))
    }

    /// Classic variant: shortest-path length for every unordered pair. Unreachable pairs stay 0.
    pub fn shortest_paths<O>(graph: &Graph, oracle: &O) -> Self
    where
        O: ShortestPathOracle + ?Sized,
    {
        let ids = graph.node_ids();
        let n = ids.len();
        let mut d = Self::zeros(n);
        let mut unreachable = 0usize;

        for i in 0..n {
            let rest = &ids[i + 1..];
            let lengths = oracle.distances_from(&ids[i], rest);
            for (offset, len) in lengths.into_iter().enumerate() {
                let j = i + 1 + offset;
                match len {
                    Some(len) => d.set_symmetric(i, j, len),
                    None => unreachable += 1,
                }
            }
        }

        let components = alg::components(graph).len();
        tracing::debug!(graph = %graph.id(), nodes = n, components, "shortest-path targets built");
        if unreachable > 0 {
            tracing::warn!(
                graph = %graph.id(),
                components,
                unreachable_pairs = unreachable,
                "disconnected graph: unreachable pairs are left unconstrained"
            );
        }
        d
    }

    /// Maxent variant: edge weights only; parallel edges are last-seen-wins, self loops ignored.
    pub fn edge_lengths(graph: &Graph) -> Self {
        let mut d = Self::zeros(graph.node_count());
        for (v, w, edge) in graph.indexed_edges() {
            if v == w {
                continue;
            }
            if edge.weight == 0.0 {
                tracing::warn!(
                    graph = %graph.id(),
                    from = edge.source(),
                    to = edge.target(),
                    "zero-weight edge is indistinguishable from a missing edge"
                );
            }
            d.set_symmetric(v, w, edge.weight);
        }
        d
    }

    fn set_symmetric(&mut self, i: usize, j: usize, value: f64) {
        self.0[(i, j)] = value;
        self.0[(j, i)] = value;
    }

    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.0.nrows() == 0
    }

    /// Raw entry, including the `0` sentinel.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.0[(i, j)]
    }

    /// Target distance between distinct nodes, `None` for the diagonal and the `0` sentinel.
    pub fn target(&self, i: usize, j: usize) -> Option<f64> {
        let d = self.0[(i, j)];
        (i != j && d != 0.0).then_some(d)
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.0
    }

    pub fn is_symmetric(&self) -> bool {
        self.0 == self.0.transpose()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix(DMatrix<f64>);

impl WeightMatrix {
    /// Classic variant: every distinct pair weighs 1 (not `1/d²`).
    pub fn uniform(n: usize) -> Self {
        let mut w = DMatrix::from_element(n, n, 1.0);
        w.fill_diagonal(0.0);
        Self(w)
    }

    /// Maxent variant: `1/d²` where a target exists, else 0.
    pub fn inverse_square(d: &DistanceMatrix) -> Self {
        let n = d.len();
        let w = DMatrix::from_fn(n, n, |i, j| match d.target(i, j) {
            Some(t) => 1.0 / (t * t),
            None => 0.0,
        });
        Self(w)
    }

    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.0.nrows() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.0[(i, j)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.0
    }

    pub fn is_symmetric(&self) -> bool {
        self.0 == self.0.transpose()
    }
}

/// Rejects negative or non-finite edge weights.
pub fn validate_weights(graph: &Graph) -> Result<()> {
    for edge in graph.edges() {
        if !(edge.weight.is_finite() && edge.weight >= 0.0) {
            return Err(Error::InvalidEdgeWeight {
                from: edge.source().to_string(),
                to: edge.target().to_string(),
                weight: edge.weight,
            });
        }
    }
    Ok(())
}

/// Builds `D` and `W` for `variant`; the oracle is only consulted by the classic variant.
pub fn build<O>(variant: Variant, graph: &Graph, oracle: &O) -> Result<(DistanceMatrix, WeightMatrix)>
where
    O: ShortestPathOracle + ?Sized,
{
    validate_weights(graph)?;
    Ok(match variant {
        Variant::Classic => {
            let d = DistanceMatrix::shortest_paths(graph, oracle);
            let w = WeightMatrix::uniform(d.len());
            (d, w)
        }
        Variant::Maxent => {
            let d = DistanceMatrix::edge_lengths(graph);
            let w = WeightMatrix::inverse_square(&d);
            (d, w)
        }
    })
}
