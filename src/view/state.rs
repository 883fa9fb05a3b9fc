//! Results view state.

use serde::Serialize;
use strum::{Display, EnumIter};

/// Progress message shown while the plan is loading. Stages only move
/// forward.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LoadingStage {
    #[default]
    #[strum(to_string = "Visiting websites for the latest selling strategies...")]
    SearchingAdvice,
    #[strum(to_string = "Retrieving market insights...")]
    RetrievingInsights,
    #[strum(to_string = "Analyzing competitor positioning...")]
    AnalyzingCompetitors,
    #[strum(to_string = "Designing campaign outline...")]
    DesigningOutline,
    #[strum(to_string = "Finalizing your marketing plan...")]
    Finalizing,
}

/// The plan as displayed: the prompt that produced it and the text so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanView {
    pub prompt: String,
    pub system_prompt: String,
    pub response: String,
    /// Start time until the `complete` event supplies its own timestamp.
    pub timestamp: String,
}

/// What one ad card slot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdSlot<'a> {
    Loading,
    Ready(&'a str),
    /// "Image not available" placeholder. Not an error.
    Unavailable,
}

/// Everything the results view renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultsState {
    /// Cleared when the plan branch settles, success or failure.
    pub loading: bool,
    pub stage: LoadingStage,
    /// Error banner.
    pub error: Option<String>,
    pub plan: Option<PlanView>,
    pub plan_loaded: bool,
    /// Independent indicator for the image branch.
    pub images_loading: bool,
    /// Base64 PNG payloads.
    pub images: Vec<String>,
}

impl ResultsState {
    /// State at mount: loading, nothing shown yet.
    pub fn mounted() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// The ads card is shown as soon as the image branch has started, even
    /// while the plan is still streaming, and stays once the plan is loaded.
    pub fn show_ads_card(&self) -> bool {
        self.error.is_none() && (self.images_loading || !self.images.is_empty() || self.plan_loaded)
    }

    /// One entry per expected ad: the image, a spinner, or a placeholder.
    pub fn ad_slots(&self, expected: usize) -> Vec<AdSlot<'_>> {
        let count = expected.max(self.images.len());
        (0..count)
            .map(|i| match self.images.get(i) {
                Some(image) => AdSlot::Ready(image),
                None if self.images_loading => AdSlot::Loading,
                None => AdSlot::Unavailable,
            })
            .collect()
    }
}
