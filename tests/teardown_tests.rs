//! Liveness gating when the view goes away mid-run.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common::{chunk_frame, complete_frame, sample_input, MockBackend};
use pitchcraft::config::GeneratorConfig;
use pitchcraft::error::GeneratorError;
use pitchcraft::orchestrator::Orchestrator;
use pitchcraft::view::{ResultsView, ViewEvent, ViewScope};

#[tokio::test]
async fn no_state_changes_after_teardown_mid_stream() {
    let scope = ViewScope::new();
    let hook_scope = scope.clone();
    let backend = Arc::new(
        MockBackend::new()
            .with_plan_buffers(vec![
                chunk_frame("first "),
                chunk_frame("second "),
                chunk_frame("third"),
                complete_frame("t"),
            ])
            .with_plan_hook(Arc::new(move |index| {
                if index == 0 {
                    hook_scope.teardown();
                }
            })),
    );

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink_events = events.clone();
    let view = ResultsView::with_scope(scope).with_event_sink(Arc::new(move |event| {
        sink_events.lock().unwrap().push(event);
    }));

    let orchestrator = Orchestrator::new(backend.clone(), GeneratorConfig::default());
    let err = orchestrator.run(sample_input(), &view).await.unwrap_err();
    assert!(matches!(err, GeneratorError::Cancelled));

    let state = view.snapshot();
    assert_eq!(state.plan.unwrap().response, "first ");
    assert!(!state.plan_loaded);
    assert!(state.error.is_none());
    assert!(state.images.is_empty());
    // Fragments two and three, plan completion, and the image branch updates
    // were all refused.
    assert!(view.discarded_updates() >= 4);

    let deltas: Vec<ViewEvent> = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, ViewEvent::PlanDelta(_)))
        .cloned()
        .collect();
    assert_eq!(deltas, vec![ViewEvent::PlanDelta("first ".into())]);
}

#[tokio::test]
async fn torn_down_view_makes_no_calls() {
    let backend = Arc::new(MockBackend::new());
    let view = ResultsView::mount();
    view.teardown();

    let orchestrator = Orchestrator::new(backend.clone(), GeneratorConfig::default());
    let err = orchestrator.run(sample_input(), &view).await.unwrap_err();

    assert!(matches!(err, GeneratorError::Cancelled));
    assert!(backend.calls().is_empty());
    assert_eq!(view.discarded_updates(), 0);
}

#[tokio::test]
async fn every_fragment_reaches_a_live_view_once() {
    let backend = Arc::new(MockBackend::new().with_plan_buffers(vec![
        chunk_frame("a"),
        format!("{}{}", chunk_frame("b"), chunk_frame("c")),
        complete_frame("t"),
    ]));
    let deltas = Arc::new(AtomicUsize::new(0));
    let counter = deltas.clone();
    let view = ResultsView::mount().with_event_sink(Arc::new(move |event| {
        if matches!(event, ViewEvent::PlanDelta(_)) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }));

    let orchestrator = Orchestrator::new(backend.clone(), GeneratorConfig::default());
    let report = orchestrator.run(sample_input(), &view).await.unwrap();

    assert_eq!(report.plan.full_text, "abc");
    assert_eq!(view.snapshot().plan.unwrap().response, "abc");
    assert_eq!(deltas.load(Ordering::SeqCst), 3);
    assert_eq!(view.discarded_updates(), 0);
    assert_eq!(backend.calls(), vec!["advice", "plan", "image_prompt", "ads"]);
}

#[tokio::test]
async fn ads_failure_is_isolated_with_mock_backend() {
    let backend = Arc::new(MockBackend::new().with_ads_status(422));
    let view = ResultsView::mount();

    let orchestrator = Orchestrator::new(backend.clone(), GeneratorConfig::default());
    let report = orchestrator.run(sample_input(), &view).await.unwrap();

    assert_eq!(report.plan.full_text, "# Plan\n");
    assert!(report.images.is_empty());
    assert!(view.snapshot().error.is_none());
    assert!(backend.calls().contains(&"ads"));
}
