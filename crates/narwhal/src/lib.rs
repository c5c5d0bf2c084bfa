#![forbid(unsafe_code)]

//! Stress-majorization graph layout.
//!
//! Two variants share one solver:
//! - [`Variant::Classic`] targets weighted shortest-path distances between every pair of nodes.
//! - [`Variant::Maxent`] targets direct edge weights only, and spreads the remaining pairs with an
//!   annealed entropy-like term.
//!
//! Runs are driven by a per-graph [`Controller`] (blocking `start`, or cooperative
//! `begin`/`step`/`stop`), optionally owned by a [`LayoutRegistry`]. The [`layout`] function is the
//! headless one-shot entry point.

pub mod animate;
pub mod config;
pub mod controller;
pub mod easing;
pub mod error;
pub mod events;
pub mod matrix;
pub mod registry;
pub mod solver;
pub mod stress;

pub use animate::{AnimationDone, AnimationSink, ImmediateSink, Interpolation};
pub use config::{LayoutConfig, LayoutOptions, StopPolicy, SweepOrder, Variant};
pub use controller::{
    CancelToken, Controller, ControllerState, RunSummary, StartOutcome, StepOutcome,
};
pub use easing::{Easing, EasingCurve};
pub use error::{Error, Result};
pub use events::{Dispatcher, EventKind, LayoutEvent};
pub use matrix::{DistanceMatrix, ShortestPathOracle, WeightMatrix};
pub use registry::LayoutRegistry;
pub use solver::{SolverState, StopReason};

pub use narwhal_graphlib;
pub use narwhal_graphlib::{Graph, GraphId, GraphOptions, Point};

/// Headless layout entry point: runs `variant` to completion and writes the coordinates back.
///
/// An easing in `options` is accepted and skipped straight to its last frame.
pub fn layout(graph: &mut Graph, variant: Variant, options: &LayoutOptions) -> Result<RunSummary> {
    let mut controller = Controller::new(variant).with_animation_sink(ImmediateSink);
    controller.configure(options)?;
    match controller.start(graph)? {
        StartOutcome::Completed(summary) | StartOutcome::Interpolating(summary) => Ok(summary),
        StartOutcome::AlreadyRunning => unreachable!("a fresh controller has no run in progress"),
    }
}

/// Stress of the graph's current coordinates against the `variant` targets.
pub fn evaluate_stress(graph: &Graph, variant: Variant) -> Result<f64> {
    let (d, w) = matrix::build(variant, graph, graph)?;
    Ok(stress::stress(&graph.positions(), &d, &w))
}
