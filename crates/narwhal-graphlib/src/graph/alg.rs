//! Shortest-path and connectivity helpers.
//!
//! `astar` is the pairwise oracle (with [`zero_heuristic`] it degenerates to Dijkstra);
//! `dijkstra` answers every target from one source in a single sweep.

use super::{Edge, Graph, Node};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// Path length accumulator: receives the traversed edge and the length so far.
pub type PathLengthFn<'a> = dyn Fn(&Edge, f64) -> f64 + 'a;

/// Estimated remaining length from the first node to the goal (second node).
pub type HeuristicFn<'a> = dyn Fn(&Node, &Node) -> f64 + 'a;

/// Accumulates edge weights along the path.
pub fn edge_weight_path_length(edge: &Edge, previous: f64) -> f64 {
    previous + edge.weight
}

pub fn zero_heuristic(_: &Node, _: &Node) -> f64 {
    0.0
}

pub struct AstarOptions<'a> {
    /// Traverse directed edges in both directions.
    pub undirected: bool,
    pub path_length: &'a PathLengthFn<'a>,
    pub heuristic: &'a HeuristicFn<'a>,
}

impl Default for AstarOptions<'_> {
    fn default() -> Self {
        Self {
            undirected: true,
            path_length: &edge_weight_path_length,
            heuristic: &zero_heuristic,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Node ids from source to target, both included.
    pub nodes: Vec<String>,
    pub path_length: f64,
}

#[derive(Debug, Clone, Copy)]
struct Frontier {
    estimate: f64,
    ix: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    // Min-heap on the estimate; ties resolved by node order for determinism.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.ix.cmp(&self.ix))
    }
}

struct Search {
    length: Vec<f64>,
    came_from: Vec<Option<usize>>,
}

fn search(
    g: &Graph,
    source: usize,
    goal: Option<usize>,
    undirected: bool,
    path_length: &PathLengthFn<'_>,
    heuristic: &HeuristicFn<'_>,
) -> Search {
    let n = g.nodes.len();
    let mut length = vec![f64::INFINITY; n];
    let mut came_from: Vec<Option<usize>> = vec![None; n];
    let mut closed = vec![false; n];
    let mut open: BinaryHeap<Frontier> = BinaryHeap::new();

    let h = |ix: usize| match goal {
        Some(goal) => heuristic(&g.nodes[ix], &g.nodes[goal]),
        None => 0.0,
    };

    length[source] = 0.0;
    open.push(Frontier {
        estimate: h(source),
        ix: source,
    });

    while let Some(Frontier { ix, .. }) = open.pop() {
        if closed[ix] {
            continue;
        }
        closed[ix] = true;
        if Some(ix) == goal {
            break;
        }

        for &e in &g.incident[ix] {
            let entry = &g.edges[e];
            let next = if entry.v_ix == ix {
                entry.w_ix
            } else if undirected || !g.options.directed {
                entry.v_ix
            } else {
                continue;
            };
            if closed[next] {
                continue;
            }
            let candidate = path_length(&entry.edge, length[ix]);
            if candidate < length[next] {
                length[next] = candidate;
                came_from[next] = Some(ix);
                open.push(Frontier {
                    estimate: candidate + h(next),
                    ix: next,
                });
            }
        }
    }

    Search { length, came_from }
}

/// Shortest path between two nodes, or `None` when either is unknown or unreachable.
pub fn astar(g: &Graph, from: &str, to: &str, opts: &AstarOptions<'_>) -> Option<Path> {
    let source = g.node_index(from)?;
    let goal = g.node_index(to)?;

    let found = search(
        g,
        source,
        Some(goal),
        opts.undirected,
        opts.path_length,
        opts.heuristic,
    );
    let path_length = found.length[goal];
    if !path_length.is_finite() {
        return None;
    }

    let mut nodes: Vec<String> = vec![g.nodes[goal].id.clone()];
    let mut cur = goal;
    while let Some(prev) = found.came_from[cur] {
        nodes.push(g.nodes[prev].id.clone());
        cur = prev;
    }
    nodes.reverse();

    Some(Path { nodes, path_length })
}

/// Weighted distance from `source` to every node, in node order (`None` when unreachable).
pub fn dijkstra(g: &Graph, source: &str, undirected: bool) -> Vec<Option<f64>> {
    let Some(source) = g.node_index(source) else {
        return vec![None; g.node_count()];
    };
    search(
        g,
        source,
        None,
        undirected,
        &edge_weight_path_length,
        &zero_heuristic,
    )
    .length
    .into_iter()
    .map(|d| d.is_finite().then_some(d))
    .collect()
}

/// Connected components (edges taken as undirected), each in discovery order.
pub fn components(g: &Graph) -> Vec<Vec<String>> {
    let mut seen = vec![false; g.nodes.len()];
    let mut out: Vec<Vec<String>> = Vec::new();

    for start in 0..g.nodes.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut comp: Vec<String> = Vec::new();
        let mut q: VecDeque<usize> = VecDeque::new();
        q.push_back(start);
        while let Some(v) = q.pop_front() {
            comp.push(g.nodes[v].id.clone());
            for &e in &g.incident[v] {
                let entry = &g.edges[e];
                let w = if entry.v_ix == v {
                    entry.w_ix
                } else {
                    entry.v_ix
                };
                if !seen[w] {
                    seen[w] = true;
                    q.push_back(w);
                }
            }
        }
        out.push(comp);
    }

    out
}
