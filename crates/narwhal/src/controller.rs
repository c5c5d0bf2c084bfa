//! Per-graph run controller: configure, run (blocking or step by step), commit, kill.

use crate::animate::{self, AnimationSink, Interpolation};
use crate::config::{LayoutConfig, LayoutOptions, Variant};
use crate::error::{Error, Result};
use crate::events::{Dispatcher, EventKind, LayoutEvent};
use crate::matrix::{self, ShortestPathOracle};
use crate::solver::{SolverState, StopReason};
use futures::channel::oneshot;
use narwhal_graphlib::{Graph, GraphId, Point};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Clears the running flag from anywhere; observed at the next sweep boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub iterations: usize,
    pub stress: f64,
    pub reason: StopReason,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartOutcome {
    /// Sweeps finished and the coordinates are committed.
    Completed(RunSummary),
    /// Sweeps finished; the commit waits for the animation sink.
    Interpolating(RunSummary),
    /// A run was already in progress; nothing happened.
    AlreadyRunning,
}

impl StartOutcome {
    pub fn summary(&self) -> Option<RunSummary> {
        match self {
            StartOutcome::Completed(s) | StartOutcome::Interpolating(s) => Some(*s),
            StartOutcome::AlreadyRunning => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Finished(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
    Interpolating,
    Killed,
}

struct Run {
    graph: GraphId,
    solver: SolverState,
    reason: Option<StopReason>,
}

struct PendingCommit {
    graph: GraphId,
    positions: Vec<Point>,
    summary: RunSummary,
    done: oneshot::Receiver<()>,
}

enum Phase {
    Idle,
    Running(Box<Run>),
    Interpolating(PendingCommit),
    Killed,
}

pub struct Controller {
    variant: Variant,
    config: Option<LayoutConfig>,
    phase: Phase,
    dispatcher: Dispatcher,
    sink: Option<Box<dyn AnimationSink>>,
    cancel: CancelToken,
    progress: f64,
    last_summary: Option<RunSummary>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("variant", &self.variant)
            .field("config", &self.config)
            .field("state", &self.state())
            .field("dispatcher", &self.dispatcher)
            .field("has_sink", &self.sink.is_some())
            .field("progress", &self.progress)
            .finish()
    }
}

impl Controller {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            config: None,
            phase: Phase::Idle,
            dispatcher: Dispatcher::new(),
            sink: None,
            cancel: CancelToken::default(),
            progress: 0.0,
            last_summary: None,
        }
    }

    pub fn with_animation_sink(mut self, sink: impl AnimationSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn set_animation_sink(&mut self, sink: Option<Box<dyn AnimationSink>>) {
        self.sink = sink;
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn config(&self) -> Option<&LayoutConfig> {
        self.config.as_ref()
    }

    pub fn events(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Token for the current or next run. Each run starts with the flag cleared.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> ControllerState {
        match self.phase {
            Phase::Idle => ControllerState::Idle,
            Phase::Running(_) => ControllerState::Running,
            Phase::Interpolating(_) => ControllerState::Interpolating,
            Phase::Killed => ControllerState::Killed,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    pub fn is_killed(&self) -> bool {
        matches!(self.phase, Phase::Killed)
    }

    /// Fraction of the iteration cap consumed by the current (or last) run.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn last_summary(&self) -> Option<RunSummary> {
        self.last_summary
    }

    /// Working coordinates of the active run, if any.
    pub fn working_positions(&self) -> Option<&[Point]> {
        match &self.phase {
            Phase::Running(run) => Some(run.solver.positions()),
            Phase::Interpolating(p) => Some(&p.positions),
            Phase::Idle | Phase::Killed => None,
        }
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_killed() {
            return Err(Error::Killed);
        }
        Ok(())
    }

    /// Resolves `options` over the variant defaults and stores the result for the next run.
    pub fn configure(&mut self, options: &LayoutOptions) -> Result<()> {
        self.ensure_alive()?;
        let config = LayoutConfig::resolve(self.variant, options)?;
        if config.easing.is_some() && self.sink.is_none() {
            return Err(Error::MissingAnimationSink);
        }
        tracing::debug!(variant = self.variant.name(), ?config, "layout configured");
        self.config = Some(config);
        Ok(())
    }

    /// Runs a whole layout: [`Controller::begin`], sweeps until a stop condition, then
    /// [`Controller::stop`].
    pub fn start(&mut self, graph: &mut Graph) -> Result<StartOutcome> {
        self.start_with_oracle(graph, None)
    }

    /// Like [`Controller::start`], with a custom shortest-path oracle for the classic variant.
    pub fn start_with_oracle(
        &mut self,
        graph: &mut Graph,
        oracle: Option<&dyn ShortestPathOracle>,
    ) -> Result<StartOutcome> {
        if !self.begin_with_oracle(graph, oracle)? {
            return Ok(StartOutcome::AlreadyRunning);
        }
        self.finish(graph)
    }

    /// Snapshots the working coordinates, builds the matrices and emits `Start`.
    ///
    /// Returns `Ok(false)` without touching anything when a run (or its commit animation) is
    /// already in progress.
    pub fn begin(&mut self, graph: &Graph) -> Result<bool> {
        self.begin_with_oracle(graph, None)
    }

    pub fn begin_with_oracle(
        &mut self,
        graph: &Graph,
        oracle: Option<&dyn ShortestPathOracle>,
    ) -> Result<bool> {
        self.ensure_alive()?;
        if !matches!(self.phase, Phase::Idle) {
            tracing::debug!(graph = %graph.id(), "layout already running; start ignored");
            return Ok(false);
        }
        let Some(config) = self.config.as_ref() else {
            return Err(Error::NotConfigured { graph: graph.id() });
        };

        let (distances, weights) = match oracle {
            Some(oracle) => matrix::build(self.variant, graph, oracle)?,
            None => matrix::build(self.variant, graph, graph)?,
        };
        let solver = SolverState::new(config, graph.positions(), distances, weights);

        tracing::debug!(
            graph = %graph.id(),
            variant = self.variant.name(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            iterations = config.iterations,
            stress = solver.current_stress(),
            "layout run started"
        );

        self.cancel.reset();
        self.progress = 0.0;
        let event = LayoutEvent {
            kind: EventKind::Start,
            graph: graph.id(),
            progress: 0.0,
            stress: solver.current_stress(),
            reason: None,
        };
        self.phase = Phase::Running(Box::new(Run {
            graph: graph.id(),
            solver,
            reason: None,
        }));
        self.dispatcher.emit(&event);
        Ok(true)
    }

    /// One sweep. Cancellation is checked before sweeping.
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.ensure_alive()?;
        let Phase::Running(run) = &mut self.phase else {
            return Err(Error::NotRunning);
        };
        if let Some(reason) = run.reason {
            return Ok(StepOutcome::Finished(reason));
        }
        if self.cancel.is_cancelled() {
            run.reason = Some(StopReason::Cancelled);
            return Ok(StepOutcome::Finished(StopReason::Cancelled));
        }

        run.solver.sweep();
        self.progress = run.solver.progress();
        tracing::trace!(
            graph = %run.graph,
            remaining = run.solver.remaining(),
            stress = run.solver.current_stress(),
            "sweep"
        );

        match run.solver.stop_reason() {
            Some(reason) => {
                run.reason = Some(reason);
                Ok(StepOutcome::Finished(reason))
            }
            None => Ok(StepOutcome::Continue),
        }
    }

    /// Sweeps the begun run to its end and stops it.
    pub fn finish(&mut self, graph: &mut Graph) -> Result<StartOutcome> {
        while self.step()? == StepOutcome::Continue {}
        self.stop(graph)
    }

    /// Ends the run: commits directly, or emits `Interpolate` and hands the move to the sink.
    /// Stopping before a stop condition was reached counts as a cancellation.
    pub fn stop(&mut self, graph: &mut Graph) -> Result<StartOutcome> {
        self.ensure_alive()?;
        let Phase::Running(run) = &self.phase else {
            return match &self.phase {
                Phase::Interpolating(p) => Ok(StartOutcome::Interpolating(p.summary)),
                _ => Err(Error::NotRunning),
            };
        };
        if run.graph != graph.id() {
            return Err(Error::GraphMismatch {
                expected: run.graph,
                actual: graph.id(),
            });
        }
        if run.solver.positions().len() != graph.node_count() {
            return Err(Error::TopologyChanged {
                expected: run.solver.positions().len(),
                actual: graph.node_count(),
            });
        }
        let easing = self.config.as_ref().and_then(|c| c.easing.clone());
        if easing.is_some() && self.sink.is_none() {
            return Err(Error::MissingAnimationSink);
        }

        let Phase::Running(run) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            unreachable!("phase checked above");
        };
        let Run { solver, reason, .. } = *run;
        let summary = RunSummary {
            iterations: solver.iterations_done(),
            stress: solver.current_stress(),
            reason: reason.unwrap_or(StopReason::Cancelled),
        };
        self.last_summary = Some(summary);
        tracing::debug!(
            graph = %graph.id(),
            iterations = summary.iterations,
            stress = summary.stress,
            reason = summary.reason.name(),
            "layout run finished"
        );
        let positions = solver.into_positions();

        let Some(easing) = easing else {
            self.commit(graph, &positions, summary);
            return Ok(StartOutcome::Completed(summary));
        };

        self.dispatcher.emit(&LayoutEvent {
            kind: EventKind::Interpolate,
            graph: graph.id(),
            progress: self.progress,
            stress: summary.stress,
            reason: Some(summary.reason),
        });
        let duration = self.config.as_ref().and_then(|c| c.duration);
        let interpolation = Interpolation::new(
            graph.id(),
            graph.node_ids(),
            graph.positions(),
            positions.clone(),
            easing,
            duration,
        );
        let (done, rx) = animate::completion();
        self.phase = Phase::Interpolating(PendingCommit {
            graph: graph.id(),
            positions,
            summary,
            done: rx,
        });
        match self.sink.as_mut() {
            Some(sink) => sink.animate(interpolation, done),
            None => done.complete(),
        }

        if self.poll_interpolation(graph)? {
            Ok(StartOutcome::Completed(summary))
        } else {
            Ok(StartOutcome::Interpolating(summary))
        }
    }

    /// Commits a finished commit animation. Returns `true` when the commit happened on this
    /// call, `false` when nothing is pending or the sink has not completed yet.
    pub fn poll_interpolation(&mut self, graph: &mut Graph) -> Result<bool> {
        self.ensure_alive()?;
        let Phase::Interpolating(pending) = &mut self.phase else {
            return Ok(false);
        };
        if pending.graph != graph.id() {
            return Err(Error::GraphMismatch {
                expected: pending.graph,
                actual: graph.id(),
            });
        }
        match pending.done.try_recv() {
            Ok(None) => return Ok(false),
            Ok(Some(())) => {}
            Err(oneshot::Canceled) => {
                tracing::warn!(
                    graph = %graph.id(),
                    "animation sink dropped its completion handle; committing anyway"
                );
            }
        }

        let Phase::Interpolating(pending) = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            unreachable!("phase checked above");
        };
        self.commit(graph, &pending.positions, pending.summary);
        Ok(true)
    }

    fn commit(&mut self, graph: &mut Graph, positions: &[Point], summary: RunSummary) {
        for (ix, p) in positions.iter().enumerate() {
            graph.set_position_at(ix, *p);
        }
        self.dispatcher.emit(&LayoutEvent {
            kind: EventKind::Stop,
            graph: graph.id(),
            progress: self.progress,
            stress: summary.stress,
            reason: Some(summary.reason),
        });
    }

    /// Releases configuration, run state, pending animation, listeners and sink. Every later
    /// call except the observers returns [`Error::Killed`].
    pub fn kill(&mut self) {
        self.cancel.cancel();
        self.phase = Phase::Killed;
        self.config = None;
        self.sink = None;
        self.dispatcher.clear();
    }
}
