//! Edge key types.
//!
//! Edges are identified by their endpoints `v`, `w` and an optional `name` (multigraph only).
//! Undirected graphs store endpoints in lexical order so `(a, b)` and `(b, a)` share a key.

use std::hash::{Hash, Hasher};

#[derive(Clone, Copy)]
pub(in crate::graph) struct EdgeKeyView<'a> {
    pub(in crate::graph) v: &'a str,
    pub(in crate::graph) w: &'a str,
    pub(in crate::graph) name: Option<&'a str>,
}

// Must hash exactly like `EdgeKey` so borrowed lookups hit the same buckets.
impl Hash for EdgeKeyView<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.v.hash(state);
        self.w.hash(state);
        self.name.hash(state);
    }
}

impl<'a> hashbrown::Equivalent<EdgeKey> for EdgeKeyView<'a> {
    fn equivalent(&self, key: &EdgeKey) -> bool {
        key.v == self.v && key.w == self.w && key.name.as_deref() == self.name
    }
}

#[derive(Debug, Clone)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
    ) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        }
    }

    /// Returns the endpoint opposite to `id`, or `None` when `id` is not an endpoint.
    pub fn other(&self, id: &str) -> Option<&str> {
        if self.v == id {
            Some(self.w.as_str())
        } else if self.w == id {
            Some(self.v.as_str())
        } else {
            None
        }
    }
}

impl PartialEq for EdgeKey {
    fn eq(&self, other: &Self) -> bool {
        self.v == other.v && self.w == other.w && self.name == other.name
    }
}

impl Eq for EdgeKey {}

impl Hash for EdgeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.v.as_str().hash(state);
        self.w.as_str().hash(state);
        self.name.as_deref().hash(state);
    }
}
