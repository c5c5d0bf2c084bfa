//! Graph container APIs used by `narwhal`.
//!
//! Nodes keep their insertion order (layout matrices are indexed by it) and carry display
//! coordinates. Edges carry a weight and are stored once per canonical key; every node keeps an
//! incidence list so shortest-path searches never rescan the whole edge set.

use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};

mod edge_key;
mod entries;
mod options;

pub mod alg;

pub use edge_key::EdgeKey;
use edge_key::EdgeKeyView;
use entries::EdgeEntry;
pub use entries::{Edge, Node, Point};
pub use options::GraphOptions;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a graph instance, stable for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphId(u64);

impl GraphId {
    fn next() -> Self {
        Self(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

type KillHook = Box<dyn FnOnce(GraphId) + Send>;

pub struct Graph {
    id: GraphId,
    options: GraphOptions,

    nodes: Vec<Node>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry>,
    edge_index: HashMap<EdgeKey, usize>,
    // Edge indices touching each node, in insertion order. Self loops appear once.
    incident: Vec<Vec<usize>>,

    kill_hooks: Vec<KillHook>,
    killed: bool,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("nodes", &self.nodes)
            .field("edges", &self.edges.iter().map(|e| &e.edge).collect::<Vec<_>>())
            .field("kill_hooks", &self.kill_hooks.len())
            .field("killed", &self.killed)
            .finish()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(GraphOptions::default())
    }
}

impl Graph {
    fn edge_key_view<'a>(&self, v: &'a str, w: &'a str, name: Option<&'a str>) -> EdgeKeyView<'a> {
        let (v, w) = if self.options.directed || v <= w {
            (v, w)
        } else {
            (w, v)
        };
        let name = if self.options.multigraph { name } else { None };
        EdgeKeyView { v, w, name }
    }

    fn canonicalize_endpoints(&self, v: String, w: String) -> (String, String) {
        if self.options.directed || v <= w {
            (v, w)
        } else {
            (w, v)
        }
    }

    fn canonicalize_name(&self, name: Option<String>) -> Option<String> {
        if self.options.multigraph { name } else { None }
    }

    pub fn new(options: GraphOptions) -> Self {
        Self {
            id: GraphId::next(),
            options,
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            incident: Vec::new(),
            kill_hooks: Vec::new(),
            killed: false,
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn is_multigraph(&self) -> bool {
        self.options.multigraph
    }

    pub fn is_directed(&self) -> bool {
        self.options.directed
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts a node, or moves it when `id` already exists.
    pub fn set_node(&mut self, id: impl Into<String>, position: Point) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].x = position.x;
            self.nodes[idx].y = position.y;
            return self;
        }
        let idx = self.nodes.len();
        self.nodes.push(Node {
            id: id.clone(),
            x: position.x,
            y: position.y,
        });
        self.incident.push(Vec::new());
        self.node_index.insert(id, idx);
        self
    }

    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return self;
        }
        self.set_node(id, Point::default())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn node_at(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// Position of `id` in node insertion order.
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.node(id).map(Node::position)
    }

    pub fn positions(&self) -> Vec<Point> {
        self.nodes.iter().map(Node::position).collect()
    }

    pub fn set_position(&mut self, id: &str, position: Point) -> bool {
        match self.node_index.get(id).copied() {
            Some(idx) => self.set_position_at(idx, position),
            None => false,
        }
    }

    pub fn set_position_at(&mut self, idx: usize, position: Point) -> bool {
        let Some(node) = self.nodes.get_mut(idx) else {
            return false;
        };
        node.x = position.x;
        node.y = position.y;
        true
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().map(|e| &e.edge)
    }

    /// Edges with their endpoint indices (`v_ix`, `w_ix`) in node order.
    pub fn indexed_edges(&self) -> impl Iterator<Item = (usize, usize, &Edge)> {
        self.edges.iter().map(|e| (e.v_ix, e.w_ix, &e.edge))
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>, weight: f64) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, weight)
    }

    /// Inserts an edge, creating missing endpoints at the origin. Re-setting an existing key
    /// overwrites its weight.
    pub fn set_edge_named(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
        weight: f64,
    ) -> &mut Self {
        let (v, w) = self.canonicalize_endpoints(v.into(), w.into());
        self.ensure_node(v.clone());
        self.ensure_node(w.clone());

        let name = self.canonicalize_name(name.map(Into::into));
        let key = EdgeKey { v, w, name };

        if let Some(&idx) = self.edge_index.get(&key) {
            self.edges[idx].edge.weight = weight;
            return self;
        }

        let (Some(v_ix), Some(w_ix)) = (self.node_index(&key.v), self.node_index(&key.w)) else {
            debug_assert!(false, "endpoints are ensured above");
            return self;
        };
        let idx = self.edges.len();
        self.incident[v_ix].push(idx);
        if w_ix != v_ix {
            self.incident[w_ix].push(idx);
        }
        self.edge_index.insert(key.clone(), idx);
        self.edges.push(EdgeEntry {
            edge: Edge { key, weight },
            v_ix,
            w_ix,
        });
        self
    }

    pub fn has_edge(&self, v: &str, w: &str, name: Option<&str>) -> bool {
        let view = self.edge_key_view(v, w, name);
        self.edge_index.contains_key(&view)
    }

    pub fn edge(&self, v: &str, w: &str, name: Option<&str>) -> Option<&Edge> {
        let view = self.edge_key_view(v, w, name);
        self.edge_index
            .get(&view)
            .map(|&idx| &self.edges[idx].edge)
    }

    /// All edges touching `v`, regardless of direction.
    pub fn node_edges(&self, v: &str) -> Vec<&Edge> {
        let Some(v_ix) = self.node_index(v) else {
            return Vec::new();
        };
        self.incident[v_ix]
            .iter()
            .map(|&e| &self.edges[e].edge)
            .collect()
    }

    pub fn neighbors(&self, v: &str) -> Vec<&str> {
        let Some(v_ix) = self.node_index(v) else {
            return Vec::new();
        };
        let mut out: Vec<&str> = Vec::new();
        for &e in &self.incident[v_ix] {
            let entry = &self.edges[e];
            let other = if entry.v_ix == v_ix {
                entry.w_ix
            } else {
                entry.v_ix
            };
            let id = self.nodes[other].id.as_str();
            if !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }

    /// Registers a callback fired once when the graph is torn down, either by [`Graph::kill`]
    /// or by dropping it.
    pub fn on_kill<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnOnce(GraphId) + Send + 'static,
    {
        self.kill_hooks.push(Box::new(hook));
        self
    }

    /// Tears the graph down: fires every registered hook (in registration order) exactly once.
    /// The graph stays readable afterwards but [`Graph::is_killed`] reports `true`.
    pub fn kill(&mut self) {
        if self.killed {
            return;
        }
        self.killed = true;
        let id = self.id;
        for hook in std::mem::take(&mut self.kill_hooks) {
            hook(id);
        }
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }
}

impl Drop for Graph {
    fn drop(&mut self) {
        self.kill();
    }
}
