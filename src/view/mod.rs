//! The results view: state, liveness, and change notifications.
//!
//! All mutation goes through [`ResultsView::update`], which refuses to touch
//! state once the view's [`ViewScope`] has been torn down.

pub mod scope;
pub mod state;

pub use scope::{ScopeGuard, ViewScope};
pub use state::{AdSlot, LoadingStage, PlanView, ResultsState};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;

/// Change notification for front ends that render incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    StageChanged(LoadingStage),
    /// Exactly the newly arrived plan fragment.
    PlanDelta(String),
    PlanCompleted { timestamp: String },
    Failed { message: String },
    ImagesReady { count: usize },
}

/// Callback receiving [`ViewEvent`]s.
pub type EventSink = Arc<dyn Fn(ViewEvent) + Send + Sync>;

/// View state guarded by a liveness scope.
pub struct ResultsView {
    scope: ViewScope,
    state: Mutex<ResultsState>,
    sink: Option<EventSink>,
    discarded: AtomicUsize,
}

impl std::fmt::Debug for ResultsView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultsView")
            .field("live", &self.scope.is_live())
            .field("state", &*self.lock())
            .field("sink", &self.sink.as_ref().map(|_| ".."))
            .finish()
    }
}

impl ResultsView {
    /// Mount a view with a fresh scope.
    pub fn mount() -> Self {
        Self::with_scope(ViewScope::new())
    }

    /// Mount a view whose liveness is owned elsewhere.
    pub fn with_scope(scope: ViewScope) -> Self {
        Self {
            scope,
            state: Mutex::new(ResultsState::mounted()),
            sink: None,
            discarded: AtomicUsize::new(0),
        }
    }

    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn is_live(&self) -> bool {
        self.scope.is_live()
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ResultsState {
        self.lock().clone()
    }

    /// How many updates arrived after teardown and were dropped.
    pub fn discarded_updates(&self) -> usize {
        self.discarded.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, ResultsState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply `apply` if the view is still live, then forward the event it
    /// returns to the sink. Returns whether the update was applied.
    ///
    /// The liveness check, the mutation and the sink call happen as one step
    /// with respect to teardown.
    pub fn update(&self, apply: impl FnOnce(&mut ResultsState) -> Option<ViewEvent>) -> bool {
        let applied = self.scope.while_live(|| {
            let event = apply(&mut self.lock());
            if let (Some(sink), Some(event)) = (&self.sink, event) {
                sink(event);
            }
        });

        if applied.is_none() {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            trace!("discarding update for torn-down view");
            return false;
        }
        true
    }

    /// Move the progress message forward; earlier stages are ignored.
    pub fn advance_stage(&self, stage: LoadingStage) -> bool {
        self.update(|state| {
            (stage > state.stage).then(|| {
                state.stage = stage;
                ViewEvent::StageChanged(stage)
            })
        })
    }

    /// Show an empty plan card for `prompt`, stamped with the current time.
    pub fn begin_plan(&self, prompt: &str, system_prompt: &str) -> bool {
        self.update(|state| {
            state.plan = Some(PlanView {
                prompt: prompt.to_string(),
                system_prompt: system_prompt.to_string(),
                response: String::new(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            });
            None
        })
    }

    /// Append one fragment to the displayed plan.
    pub fn append_plan(&self, fragment: &str) -> bool {
        self.update(|state| {
            let plan = state.plan.get_or_insert_with(PlanView::default);
            plan.response.push_str(fragment);
            Some(ViewEvent::PlanDelta(fragment.to_string()))
        })
    }

    /// Mark the plan loaded and clear the overall loading flag.
    pub fn complete_plan(&self, timestamp: Option<&str>) -> bool {
        self.update(|state| {
            let plan = state.plan.get_or_insert_with(PlanView::default);
            if let Some(ts) = timestamp {
                plan.timestamp = ts.to_string();
            }
            state.plan_loaded = true;
            state.loading = false;
            Some(ViewEvent::PlanCompleted {
                timestamp: plan.timestamp.clone(),
            })
        })
    }

    /// Show the error banner and clear the overall loading flag.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        self.update(|state| {
            state.error = Some(message.clone());
            state.loading = false;
            Some(ViewEvent::Failed { message })
        })
    }

    pub fn begin_images(&self) -> bool {
        self.update(|state| {
            state.images_loading = true;
            None
        })
    }

    /// Store the generated ads (possibly none) and stop the image spinner.
    pub fn finish_images(&self, images: Vec<String>) -> bool {
        self.update(|state| {
            let count = images.len();
            state.images = images;
            state.images_loading = false;
            Some(ViewEvent::ImagesReady { count })
        })
    }
}
