//! Delegated coordinate interpolation.
//!
//! When an easing is configured, the controller does not write the final coordinates itself.
//! It hands an [`Interpolation`] plus a one-shot [`AnimationDone`] handle to an
//! [`AnimationSink`], and commits once the sink completes the handle.

use crate::easing::Easing;
use futures::channel::oneshot;
use narwhal_graphlib::{GraphId, Point};
use std::time::Duration;

/// Movement of every node from its display position to its laid-out position.
#[derive(Debug, Clone)]
pub struct Interpolation {
    graph: GraphId,
    ids: Vec<String>,
    from: Vec<Point>,
    to: Vec<Point>,
    easing: Easing,
    duration: Option<Duration>,
}

impl Interpolation {
    pub(crate) fn new(
        graph: GraphId,
        ids: Vec<String>,
        from: Vec<Point>,
        to: Vec<Point>,
        easing: Easing,
        duration: Option<Duration>,
    ) -> Self {
        debug_assert_eq!(ids.len(), from.len());
        debug_assert_eq!(ids.len(), to.len());
        Self {
            graph,
            ids,
            from,
            to,
            easing,
            duration,
        }
    }

    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn origins(&self) -> &[Point] {
        &self.from
    }

    pub fn targets(&self) -> &[Point] {
        &self.to
    }

    pub fn easing(&self) -> &Easing {
        &self.easing
    }

    /// `None` leaves the choice to the sink.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Eased positions at linear progress `t` (clamped to `[0, 1]`), in node order.
    pub fn frame(&self, t: f64) -> Vec<Point> {
        let k = self.easing.apply(t);
        self.from
            .iter()
            .zip(&self.to)
            .map(|(a, b)| Point::new(a.x + (b.x - a.x) * k, a.y + (b.y - a.y) * k))
            .collect()
    }

    /// Same as [`Interpolation::frame`], paired with node ids.
    pub fn frame_by_id(&self, t: f64) -> impl Iterator<Item = (&str, Point)> {
        self.ids.iter().map(String::as_str).zip(self.frame(t))
    }
}

/// Completion handle; consuming it signals that the animation reached its end.
#[derive(Debug)]
pub struct AnimationDone {
    tx: oneshot::Sender<()>,
}

impl AnimationDone {
    pub fn complete(self) {
        // The controller may have been killed meanwhile.
        let _ = self.tx.send(());
    }
}

pub(crate) fn completion() -> (AnimationDone, oneshot::Receiver<()>) {
    let (tx, rx) = oneshot::channel();
    (AnimationDone { tx }, rx)
}

/// Renders an interpolation and calls [`AnimationDone::complete`] when it ends.
pub trait AnimationSink: Send {
    fn animate(&mut self, interpolation: Interpolation, done: AnimationDone);
}

impl<F> AnimationSink for F
where
    F: FnMut(Interpolation, AnimationDone) + Send,
{
    fn animate(&mut self, interpolation: Interpolation, done: AnimationDone) {
        self(interpolation, done)
    }
}

/// Skips straight to the last frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateSink;

impl AnimationSink for ImmediateSink {
    fn animate(&mut self, _interpolation: Interpolation, done: AnimationDone) {
        done.complete();
    }
}
