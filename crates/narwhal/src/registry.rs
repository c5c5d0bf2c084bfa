//! Caller-owned map from graph to its layout controller.

use crate::animate::AnimationSink;
use crate::config::{LayoutOptions, Variant};
use crate::controller::{Controller, StartOutcome};
use crate::error::{Error, Result};
use crate::events::Dispatcher;
use narwhal_graphlib::{Graph, GraphId};
use rustc_hash::FxHashMap;
use std::sync::mpsc;

type SinkFactory = Box<dyn Fn(GraphId) -> Box<dyn AnimationSink> + Send>;

/// One controller per graph, all of the same variant.
///
/// The first `configure` for a graph registers a [`Graph::on_kill`] hook. Killing or dropping the
/// graph posts its id back here; the controller is killed and dropped before the next call is
/// served, and every later call for a killed graph returns [`Error::GraphKilled`].
pub struct LayoutRegistry {
    variant: Variant,
    slots: FxHashMap<GraphId, Controller>,
    teardown_tx: mpsc::Sender<GraphId>,
    teardown_rx: mpsc::Receiver<GraphId>,
    sink_factory: Option<SinkFactory>,
}

impl std::fmt::Debug for LayoutRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutRegistry")
            .field("variant", &self.variant)
            .field("graphs", &self.slots.len())
            .finish()
    }
}

impl LayoutRegistry {
    pub fn new(variant: Variant) -> Self {
        let (teardown_tx, teardown_rx) = mpsc::channel();
        Self {
            variant,
            slots: FxHashMap::default(),
            teardown_tx,
            teardown_rx,
            sink_factory: None,
        }
    }

    /// Attaches a fresh sink from `factory` to every controller the registry creates.
    pub fn with_animation_sinks<F>(mut self, factory: F) -> Self
    where
        F: Fn(GraphId) -> Box<dyn AnimationSink> + Send + 'static,
    {
        self.sink_factory = Some(Box::new(factory));
        self
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Live controllers. Teardowns not yet reaped still count until the next graph call.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Kills and drops the controllers of graphs torn down since the last call.
    fn reap(&mut self) {
        while let Ok(id) = self.teardown_rx.try_recv() {
            if let Some(mut controller) = self.slots.remove(&id) {
                controller.kill();
                tracing::debug!(graph = %id, "layout controller released on graph teardown");
            }
        }
    }

    fn check_alive(&mut self, graph: &Graph) -> Result<()> {
        self.reap();
        if graph.is_killed() {
            return Err(Error::GraphKilled { graph: graph.id() });
        }
        Ok(())
    }

    fn slot(&mut self, graph: &Graph) -> Result<&mut Controller> {
        self.check_alive(graph)?;
        self.slots
            .get_mut(&graph.id())
            .ok_or(Error::NotConfigured { graph: graph.id() })
    }

    /// Creates the graph's controller on first use and (re)configures it. Returns the graph's
    /// dispatcher so listeners can be attached right away.
    pub fn configure(&mut self, graph: &mut Graph, options: &LayoutOptions) -> Result<&mut Dispatcher> {
        self.check_alive(graph)?;
        let id = graph.id();
        if !self.slots.contains_key(&id) {
            let mut controller = Controller::new(self.variant);
            if let Some(factory) = &self.sink_factory {
                controller.set_animation_sink(Some(factory(id)));
            }
            let tx = self.teardown_tx.clone();
            graph.on_kill(move |id| {
                // The registry may be gone already.
                let _ = tx.send(id);
            });
            self.slots.insert(id, controller);
        }
        let controller = self.slot(graph)?;
        controller.configure(options)?;
        Ok(controller.events())
    }

    /// Configures first when `options` is given, then runs the layout.
    pub fn start(&mut self, graph: &mut Graph, options: Option<&LayoutOptions>) -> Result<StartOutcome> {
        if let Some(options) = options {
            self.configure(graph, options)?;
        }
        let controller = self.slot(graph)?;
        if controller.config().is_none() {
            return Err(Error::NotConfigured { graph: graph.id() });
        }
        controller.start(graph)
    }

    pub fn is_running(&mut self, graph: &Graph) -> Result<bool> {
        Ok(self.slot(graph)?.is_running())
    }

    pub fn progress(&mut self, graph: &Graph) -> Result<f64> {
        Ok(self.slot(graph)?.progress())
    }

    pub fn poll_interpolation(&mut self, graph: &mut Graph) -> Result<bool> {
        self.slot(graph)?.poll_interpolation(graph)
    }

    pub fn events(&mut self, graph: &Graph) -> Result<&mut Dispatcher> {
        Ok(self.slot(graph)?.events())
    }

    /// Direct access for the cooperative `begin`/`step`/`stop` form.
    pub fn controller(&mut self, graph: &Graph) -> Result<&mut Controller> {
        self.slot(graph)
    }
}
