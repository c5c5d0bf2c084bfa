//! Majorization sweeps and the stop test.
//!
//! Each sweep moves every node to the weighted average that minimizes the stress majorant with
//! all other nodes held fixed. In the maxent variant, pairs without a target distance add an
//! annealed term `alpha · (p_i − p_j) / ‖p_i − p_j‖^(q+2)`.

use crate::config::{LayoutConfig, StopPolicy, SweepOrder, Variant};
use crate::matrix::{DistanceMatrix, WeightMatrix};
use crate::stress::stress;
use narwhal_graphlib::Point;

/// `alpha` is multiplied by this factor every `alpha_step` sweeps.
pub const ANNEALING_FACTOR: f64 = 0.3;

/// Pairs closer than this are treated as coincident.
pub const MIN_DISTANCE: f64 = 1e-9;

const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Relative stress decrease fell below `epsilon`.
    Converged,
    /// The iteration cap was reached.
    Exhausted,
    /// The run was cancelled or stopped before either of the above.
    Cancelled,
}

impl StopReason {
    pub fn name(self) -> &'static str {
        match self {
            StopReason::Converged => "converged",
            StopReason::Exhausted => "exhausted",
            StopReason::Cancelled => "cancelled",
        }
    }
}

/// Annealed multiplier of the non-edge term for the sweep that leaves `remaining` iterations.
pub fn annealing_alpha(iterations: usize, remaining: usize, alpha_step: usize, q: f64) -> f64 {
    let stage = iterations.saturating_sub(remaining) / alpha_step.max(1);
    let stage = i32::try_from(stage).unwrap_or(i32::MAX);
    let alpha = ANNEALING_FACTOR.powi(stage);
    if q < 0.0 { -alpha } else { alpha }
}

#[derive(Debug, Clone, Copy)]
struct Params {
    variant: Variant,
    epsilon: f64,
    iterations: usize,
    alpha_step: usize,
    q: f64,
    stop_policy: StopPolicy,
    sweep: SweepOrder,
}

/// Working state of one layout run.
#[derive(Debug, Clone)]
pub struct SolverState {
    params: Params,
    distances: DistanceMatrix,
    weights: WeightMatrix,
    positions: Vec<Point>,
    snapshot: Vec<Point>,
    iter_count: usize,
    previous_stress: Option<f64>,
    current_stress: f64,
}

impl SolverState {
    /// Starts a run from `positions` (the working copy of the display coordinates).
    pub fn new(
        config: &LayoutConfig,
        positions: Vec<Point>,
        distances: DistanceMatrix,
        weights: WeightMatrix,
    ) -> Self {
        let current_stress = stress(&positions, &distances, &weights);
        Self {
            params: Params {
                variant: config.variant,
                epsilon: config.epsilon,
                iterations: config.iterations,
                alpha_step: config.alpha_step,
                q: config.q,
                stop_policy: config.stop_policy,
                sweep: config.sweep,
            },
            distances,
            weights,
            positions,
            snapshot: Vec::new(),
            iter_count: config.iterations,
            previous_stress: None,
            current_stress,
        }
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<Point> {
        self.positions
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    pub fn iterations(&self) -> usize {
        self.params.iterations
    }

    /// Sweeps left before the cap.
    pub fn remaining(&self) -> usize {
        self.iter_count
    }

    pub fn iterations_done(&self) -> usize {
        self.params.iterations - self.iter_count
    }

    pub fn progress(&self) -> f64 {
        self.iterations_done() as f64 / self.params.iterations as f64
    }

    pub fn current_stress(&self) -> f64 {
        self.current_stress
    }

    pub fn previous_stress(&self) -> Option<f64> {
        self.previous_stress
    }

    /// `alpha` of the most recent sweep (1 before the first one).
    pub fn alpha(&self) -> f64 {
        annealing_alpha(
            self.params.iterations,
            self.iter_count,
            self.params.alpha_step,
            self.params.q,
        )
    }

    /// Relative-stress test: `(previous − current) < previous · epsilon`.
    ///
    /// The comparison is strict, so a layout whose stress is already exactly zero never passes
    /// it (`0 − 0 < 0` is false). Such a run keeps sweeping until the iteration cap and ends as
    /// [`StopReason::Exhausted`].
    pub fn finished(&self) -> bool {
        match self.previous_stress {
            Some(prev) => prev - self.current_stress < prev * self.params.epsilon,
            None => false,
        }
    }

    /// Why the run should end after the last sweep, if it should.
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.params.stop_policy == StopPolicy::EpsilonOrCap && self.finished() {
            return Some(StopReason::Converged);
        }
        (self.iter_count == 0).then_some(StopReason::Exhausted)
    }

    /// Runs one sweep and re-evaluates the stress. Returns `false` once the cap is reached.
    pub fn sweep(&mut self) -> bool {
        if self.iter_count == 0 {
            return false;
        }
        self.iter_count -= 1;
        let alpha = self.alpha();

        match self.params.sweep {
            SweepOrder::InPlace => {
                for i in 0..self.positions.len() {
                    if let Some(p) = self.relocate(i, &self.positions, alpha) {
                        self.positions[i] = p;
                    }
                }
            }
            SweepOrder::Snapshot => {
                let mut snapshot = std::mem::take(&mut self.snapshot);
                snapshot.clone_from(&self.positions);
                for i in 0..snapshot.len() {
                    if let Some(p) = self.relocate(i, &snapshot, alpha) {
                        self.positions[i] = p;
                    }
                }
                self.snapshot = snapshot;
            }
        }

        self.previous_stress = Some(self.current_stress);
        self.current_stress = stress(&self.positions, &self.distances, &self.weights);
        true
    }

    /// New position of node `i` given `coords`, or `None` when the update is undefined
    /// (no weighted neighbour, or a non-finite result).
    fn relocate(&self, i: usize, coords: &[Point], alpha: f64) -> Option<Point> {
        let pi = coords[i];
        let mut new_x = 0.0;
        let mut new_y = 0.0;
        let mut total_weight = 0.0;

        for (j, pj) in coords.iter().enumerate() {
            if j == i {
                continue;
            }
            let mut dx = pi.x - pj.x;
            let mut dy = pi.y - pj.y;
            let mut dist = (dx * dx + dy * dy).sqrt();

            match self.distances.target(i, j) {
                Some(target) => {
                    if dist < MIN_DISTANCE {
                        (dx, dy) = separation(i, j);
                        dx *= MIN_DISTANCE;
                        dy *= MIN_DISTANCE;
                        dist = MIN_DISTANCE;
                    }
                    let w = self.weights.get(i, j);
                    new_x += w * (pj.x + target * dx / dist);
                    new_y += w * (pj.y + target * dy / dist);
                    total_weight += w;
                }
                None if self.params.variant == Variant::Maxent => {
                    if dist < MIN_DISTANCE {
                        continue;
                    }
                    let force = dist.powf(self.params.q + 2.0);
                    new_x += alpha * dx / force;
                    new_y += alpha * dy / force;
                }
                None => {}
            }
        }

        if total_weight <= 0.0 {
            return None;
        }
        let p = Point::new(new_x / total_weight, new_y / total_weight);
        p.is_finite().then_some(p)
    }
}

/// Unit direction pushing `i` away from a coincident `j`; `separation(j, i)` is its opposite.
fn separation(i: usize, j: usize) -> (f64, f64) {
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
    let theta = (lo as f64 * 31.0 + hi as f64 * 17.0 + 1.0) * GOLDEN_ANGLE;
    let sign = if i < j { 1.0 } else { -1.0 };
    (sign * theta.cos(), sign * theta.sin())
}
