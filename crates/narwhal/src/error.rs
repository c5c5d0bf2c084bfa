use narwhal_graphlib::GraphId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("edge {from} -> {to} has an invalid weight: {weight}")]
    InvalidEdgeWeight { from: String, to: String, weight: f64 },

    #[error("invalid layout option `{option}`: {reason}")]
    InvalidOption { option: &'static str, reason: String },

    #[error("unknown easing curve: {name}")]
    UnknownEasing { name: String },

    #[error("an easing is configured but no animation sink is attached")]
    MissingAnimationSink,

    #[error("no layout is configured for graph {graph}")]
    NotConfigured { graph: GraphId },

    #[error("graph {graph} has been killed")]
    GraphKilled { graph: GraphId },

    #[error("layout controller has been killed")]
    Killed,

    #[error("no layout run is in progress")]
    NotRunning,

    #[error("layout run belongs to graph {expected}, got graph {actual}")]
    GraphMismatch { expected: GraphId, actual: GraphId },

    #[error("graph changed during the layout run: expected {expected} nodes, found {actual}")]
    TopologyChanged { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
