use narwhal::narwhal_graphlib::{Graph, Point};
use narwhal::{
    AnimationDone, Controller, ControllerState, EasingCurve, Error, EventKind, ImmediateSink,
    Interpolation, LayoutOptions, StartOutcome, StepOutcome, StopPolicy, StopReason, Variant,
};
use std::sync::{Arc, Mutex};

fn path(n: usize) -> Graph {
    let mut g = Graph::default();
    for i in 0..n {
        g.set_node(format!("n{i}"), Point::new(i as f64 * 0.7, (i % 3) as f64));
    }
    for i in 1..n {
        g.set_edge(format!("n{}", i - 1), format!("n{i}"), 1.0);
    }
    g
}

fn record(controller: &mut Controller) -> Arc<Mutex<Vec<EventKind>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for kind in [EventKind::Start, EventKind::Interpolate, EventKind::Stop] {
        let seen = Arc::clone(&seen);
        controller.events().on(kind, move |e| seen.lock().unwrap().push(e.kind));
    }
    seen
}

fn cap_only(iterations: usize) -> LayoutOptions {
    LayoutOptions {
        iterations: Some(iterations),
        stop_policy: Some(StopPolicy::IterationCapOnly),
        ..Default::default()
    }
}

#[test]
fn start_emits_start_then_stop_and_commits() {
    let mut g = path(4);
    let before = g.positions();
    let mut c = Controller::new(Variant::Classic);
    let seen = record(&mut c);
    c.configure(&cap_only(20)).unwrap();

    let outcome = c.start(&mut g).unwrap();
    let summary = outcome.summary().unwrap();
    assert!(matches!(outcome, StartOutcome::Completed(_)));
    assert_eq!(summary.iterations, 20);
    assert_eq!(summary.reason, StopReason::Exhausted);
    assert_eq!(*seen.lock().unwrap(), vec![EventKind::Start, EventKind::Stop]);
    assert_ne!(g.positions(), before);
    assert_eq!(c.state(), ControllerState::Idle);
    assert!(c.working_positions().is_none());
    assert_eq!(c.progress(), 1.0);
}

#[test]
fn start_requires_configuration() {
    let mut g = path(2);
    let mut c = Controller::new(Variant::Maxent);
    let err = c.start(&mut g).unwrap_err();
    assert!(matches!(err, Error::NotConfigured { graph } if graph == g.id()));
}

#[test]
fn easing_without_a_sink_is_rejected() {
    let mut c = Controller::new(Variant::Classic);
    let opts = LayoutOptions {
        easing: Some(EasingCurve::CubicInOut.into()),
        ..Default::default()
    };
    assert!(matches!(c.configure(&opts), Err(Error::MissingAnimationSink)));

    let mut c = Controller::new(Variant::Classic).with_animation_sink(ImmediateSink);
    c.configure(&opts).unwrap();
}

#[test]
fn synchronous_sink_commits_right_away() {
    let mut g = path(3);
    let mut c = Controller::new(Variant::Classic).with_animation_sink(ImmediateSink);
    let seen = record(&mut c);
    c.configure(&LayoutOptions {
        easing: Some(EasingCurve::Linear.into()),
        ..cap_only(5)
    })
    .unwrap();

    assert!(matches!(c.start(&mut g).unwrap(), StartOutcome::Completed(_)));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![EventKind::Start, EventKind::Interpolate, EventKind::Stop]
    );
}

#[test]
fn deferred_sink_commits_on_poll() {
    type Pending = Arc<Mutex<Option<(Interpolation, AnimationDone)>>>;
    let pending: Pending = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&pending);
    let sink = move |it: Interpolation, done: AnimationDone| {
        *slot.lock().unwrap() = Some((it, done));
    };

    let mut g = path(3);
    let before = g.positions();
    let mut c = Controller::new(Variant::Classic).with_animation_sink(sink);
    let seen = record(&mut c);
    c.configure(&LayoutOptions {
        easing: Some(EasingCurve::QuadraticOut.into()),
        duration: Some(std::time::Duration::from_millis(250)),
        ..cap_only(10)
    })
    .unwrap();

    assert!(matches!(c.start(&mut g).unwrap(), StartOutcome::Interpolating(_)));
    assert_eq!(c.state(), ControllerState::Interpolating);
    assert_eq!(g.positions(), before);
    assert!(!c.poll_interpolation(&mut g).unwrap());
    // A second start while the commit animation is pending is ignored.
    assert_eq!(c.start(&mut g).unwrap(), StartOutcome::AlreadyRunning);

    let (it, done) = pending.lock().unwrap().take().unwrap();
    assert_eq!(it.graph(), g.id());
    assert_eq!(it.origins(), before.as_slice());
    assert_eq!(it.duration(), Some(std::time::Duration::from_millis(250)));
    assert_eq!(it.frame(0.0), before);
    let target = it.targets().to_vec();
    done.complete();

    assert!(c.poll_interpolation(&mut g).unwrap());
    assert_eq!(g.positions(), target);
    assert_eq!(c.state(), ControllerState::Idle);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![EventKind::Start, EventKind::Interpolate, EventKind::Stop]
    );
}

#[test]
fn dropped_completion_handle_still_commits() {
    let mut g = path(3);
    let mut c = Controller::new(Variant::Classic)
        .with_animation_sink(|_: Interpolation, done: AnimationDone| drop(done));
    c.configure(&LayoutOptions {
        easing: Some(EasingCurve::Linear.into()),
        ..cap_only(3)
    })
    .unwrap();
    assert!(matches!(c.start(&mut g).unwrap(), StartOutcome::Completed(_)));
}

#[test]
fn start_while_running_is_a_no_op() {
    let mut g = path(3);
    let mut c = Controller::new(Variant::Classic);
    c.configure(&cap_only(10)).unwrap();
    assert!(c.begin(&g).unwrap());
    assert!(c.is_running());
    assert_eq!(c.start(&mut g).unwrap(), StartOutcome::AlreadyRunning);
    assert!(!c.begin(&g).unwrap());
    assert!(c.is_running());
}

#[test]
fn progress_is_monotone_and_reaches_one() {
    let mut g = path(5);
    let mut c = Controller::new(Variant::Maxent);
    c.configure(&cap_only(40)).unwrap();
    assert_eq!(c.progress(), 0.0);
    assert!(c.begin(&g).unwrap());

    let mut last = c.progress();
    let reason = loop {
        match c.step().unwrap() {
            StepOutcome::Continue => {
                assert!(c.progress() >= last);
                last = c.progress();
            }
            StepOutcome::Finished(reason) => break reason,
        }
    };
    assert_eq!(reason, StopReason::Exhausted);
    assert_eq!(c.progress(), 1.0);
    let summary = c.stop(&mut g).unwrap().summary().unwrap();
    assert_eq!(summary.iterations, 40);
    // Retained after the run.
    assert_eq!(c.progress(), 1.0);
}

#[test]
fn cancellation_is_observed_at_the_next_sweep() {
    let mut g = path(4);
    let before = g.positions();
    let mut c = Controller::new(Variant::Classic);
    c.configure(&cap_only(100)).unwrap();
    assert!(c.begin(&g).unwrap());
    assert_eq!(c.step().unwrap(), StepOutcome::Continue);
    assert_eq!(c.step().unwrap(), StepOutcome::Continue);

    c.cancel_token().cancel();
    assert_eq!(c.step().unwrap(), StepOutcome::Finished(StopReason::Cancelled));
    let summary = c.finish(&mut g).unwrap().summary().unwrap();
    assert_eq!(summary.iterations, 2);
    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_ne!(g.positions(), before);

    // The next run starts with a fresh token.
    assert!(c.begin(&g).unwrap());
    assert_eq!(c.step().unwrap(), StepOutcome::Continue);
}

#[test]
fn cancelling_from_another_thread() {
    let mut g = path(6);
    let mut c = Controller::new(Variant::Classic);
    c.configure(&cap_only(1_000_000)).unwrap();
    assert!(c.begin(&g).unwrap());
    let token = c.cancel_token();
    std::thread::spawn(move || token.cancel()).join().unwrap();
    let summary = c.finish(&mut g).unwrap().summary().unwrap();
    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_eq!(summary.iterations, 0);
}

#[test]
fn stop_checks_the_graph() {
    let g = path(3);
    let mut other = path(3);
    let mut c = Controller::new(Variant::Classic);
    c.configure(&cap_only(5)).unwrap();
    assert!(c.begin(&g).unwrap());
    assert!(matches!(
        c.stop(&mut other),
        Err(Error::GraphMismatch { expected, actual }) if expected == g.id() && actual == other.id()
    ));

    let mut grown = g;
    grown.ensure_node("extra");
    assert!(matches!(
        c.stop(&mut grown),
        Err(Error::TopologyChanged { expected: 3, actual: 4 })
    ));
}

#[test]
fn stopping_early_counts_as_cancelled() {
    let mut g = path(3);
    let mut c = Controller::new(Variant::Classic);
    c.configure(&cap_only(50)).unwrap();
    assert!(c.begin(&g).unwrap());
    c.step().unwrap();
    let summary = c.stop(&mut g).unwrap().summary().unwrap();
    assert_eq!(summary.reason, StopReason::Cancelled);
    assert!(matches!(c.step(), Err(Error::NotRunning)));
}

#[test]
fn killed_controller_rejects_everything() {
    let mut g = path(3);
    let mut c = Controller::new(Variant::Classic);
    c.events().on(EventKind::Stop, |_| {});
    c.configure(&LayoutOptions::default()).unwrap();
    assert!(c.begin(&g).unwrap());

    c.kill();
    assert!(c.is_killed());
    assert!(!c.is_running());
    assert!(c.config().is_none());
    assert_eq!(c.events().listener_count(EventKind::Stop), 0);
    assert!(matches!(c.configure(&LayoutOptions::default()), Err(Error::Killed)));
    assert!(matches!(c.start(&mut g), Err(Error::Killed)));
    assert!(matches!(c.begin(&g), Err(Error::Killed)));
    assert!(matches!(c.step(), Err(Error::Killed)));
    assert!(matches!(c.stop(&mut g), Err(Error::Killed)));
}

#[test]
fn reconfigure_merges_over_defaults() {
    let mut c = Controller::new(Variant::Maxent);
    c.configure(&LayoutOptions {
        iterations: Some(7),
        q: Some(-0.5),
        ..Default::default()
    })
    .unwrap();
    c.configure(&LayoutOptions {
        q: Some(1.0),
        ..Default::default()
    })
    .unwrap();
    let cfg = c.config().unwrap();
    assert_eq!(cfg.iterations, 250);
    assert_eq!(cfg.q, 1.0);
}

#[test]
fn parallel_runs_on_distinct_graphs() {
    let mut graphs: Vec<Graph> = (3..7).map(path).collect();
    let expected: Vec<Vec<Point>> = (3..7)
        .map(|n| {
            let mut g = path(n);
            narwhal::layout(&mut g, Variant::Classic, &cap_only(30)).unwrap();
            g.positions()
        })
        .collect();

    std::thread::scope(|scope| {
        for g in graphs.iter_mut() {
            scope.spawn(move || {
                let mut c = Controller::new(Variant::Classic);
                c.configure(&cap_only(30)).unwrap();
                c.start(g).unwrap();
            });
        }
    });

    for (g, want) in graphs.iter().zip(expected) {
        assert_eq!(g.positions(), want);
    }
}
