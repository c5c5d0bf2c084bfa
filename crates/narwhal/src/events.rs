//! Typed lifecycle events.

use crate::solver::StopReason;
use indexmap::IndexMap;
use narwhal_graphlib::GraphId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Working coordinates are snapshotted and the matrices built.
    Start,
    /// Sweeps are over; the commit is delegated to the animation sink.
    Interpolate,
    /// Coordinates are committed and the run is over.
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEvent {
    pub kind: EventKind,
    pub graph: GraphId,
    pub progress: f64,
    pub stress: f64,
    /// Set on `Interpolate` and `Stop`.
    pub reason: Option<StopReason>,
}

type Listener = Box<dyn FnMut(&LayoutEvent) + Send>;

/// Per-graph callback lists, invoked in registration order.
#[derive(Default)]
pub struct Dispatcher {
    listeners: IndexMap<EventKind, Vec<Listener>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut m = f.debug_map();
        for (kind, ls) in &self.listeners {
            m.entry(kind, &ls.len());
        }
        m.finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> &mut Self
    where
        F: FnMut(&LayoutEvent) + Send + 'static,
    {
        self.listeners
            .entry(kind)
            .or_default()
            .push(Box::new(listener));
        self
    }

    /// Drops every listener registered for `kind`.
    pub fn off(&mut self, kind: EventKind) -> &mut Self {
        self.listeners.shift_remove(&kind);
        self
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    pub fn emit(&mut self, event: &LayoutEvent) {
        tracing::trace!(graph = %event.graph, kind = ?event.kind, "layout event");
        if let Some(ls) = self.listeners.get_mut(&event.kind) {
            for l in ls.iter_mut() {
                l(event);
            }
        }
    }
}
