//! Graph configuration options.

#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    /// Allow several edges between the same pair of nodes, distinguished by name.
    pub multigraph: bool,
    pub directed: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            multigraph: false,
            directed: false,
        }
    }
}
