//! Public node/edge records and the coordinate type stored on nodes.

use super::EdgeKey;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A node with its display coordinates.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl Node {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub key: EdgeKey,
    pub weight: f64,
}

impl Edge {
    pub fn source(&self) -> &str {
        &self.key.v
    }

    pub fn target(&self) -> &str {
        &self.key.w
    }
}

#[derive(Debug, Clone)]
pub(in crate::graph) struct EdgeEntry {
    pub(in crate::graph) edge: Edge,
    pub(in crate::graph) v_ix: usize,
    pub(in crate::graph) w_ix: usize,
}
