//! Plan/ads orchestration.
//!
//! Advice is fetched first; the plan stream and the image pipeline then run
//! concurrently on the same task. The plan path is mandatory and its failure
//! fails the run. The image path is optional: every error there is
//! downgraded to an empty image list.

pub mod prompts;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::backend::MarketingBackend;
use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::storage::{take_form_input, FormStore};
use crate::stream;
use crate::types::{AdImageRequest, AdviceRequest, AggregateResult, FormInput};
use crate::util::timeout::with_timeout;
use crate::view::{LoadingStage, ResultsView};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The advice payload exactly as the backend returned it.
    pub advice: serde_json::Value,
    pub plan: AggregateResult,
    /// Base64 PNG payloads; empty when the image branch failed.
    pub images: Vec<String>,
}

/// Runs one results-page generation against a backend.
pub struct Orchestrator {
    backend: Arc<dyn MarketingBackend>,
    config: GeneratorConfig,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn MarketingBackend>, config: GeneratorConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Read the submitted form from `store`, then [`run`](Self::run).
    ///
    /// A missing record fails before any network call is made.
    pub async fn run_from_store(
        &self,
        store: Arc<dyn FormStore>,
        view: &ResultsView,
    ) -> Result<RunReport> {
        let input = match take_form_input(store, self.config.cleanup_delay) {
            Ok(input) => input,
            Err(e) => {
                warn!(error = %e, "no usable form input");
                view.fail(e.user_message());
                return Err(e);
            }
        };
        self.run(input, view).await
    }

    /// Generate the plan and ads for `input`, reflecting progress in `view`.
    ///
    /// Returns [`GeneratorError::Cancelled`] if the view is torn down before
    /// the run finishes; in-flight requests are allowed to complete but their
    /// results are discarded.
    pub async fn run(&self, input: FormInput, view: &ResultsView) -> Result<RunReport> {
        ensure_live(view)?;
        info!(title = %input.title, "starting marketing plan generation");

        let advice = match self.fetch_advice(&input).await {
            Ok(advice) => advice,
            Err(e) => {
                error!(error = %e, category = ?e.category(), "selling advice request failed");
                view.fail(e.user_message());
                return Err(e);
            }
        };
        ensure_live(view)?;
        view.advance_stage(LoadingStage::RetrievingInsights);

        let (plan, images) = tokio::join!(
            self.plan_branch(&input, &advice, view),
            self.image_branch(&input, &advice, view),
        );
        let plan = plan?;
        ensure_live(view)?;

        Ok(RunReport {
            advice,
            plan,
            images,
        })
    }

    async fn fetch_advice(&self, input: &FormInput) -> Result<serde_json::Value> {
        let request = AdviceRequest {
            product: input.product_line(),
            target_audience: input.audience.clone(),
            search_limit: self.config.search_limit,
        };
        with_timeout(
            self.config.request_timeout,
            self.backend.search_selling_advice(&request),
        )
        .await
    }

    /// Stream the plan into the view. Clears the overall loading flag when it
    /// settles either way.
    async fn plan_branch(
        &self,
        input: &FormInput,
        advice: &serde_json::Value,
        view: &ResultsView,
    ) -> Result<AggregateResult> {
        let request = prompts::plan_request(input, advice);
        view.advance_stage(LoadingStage::AnalyzingCompetitors);
        view.begin_plan(&request.prompt, &request.system_prompt);

        let mut on_chunk = |fragment: &str| {
            view.advance_stage(LoadingStage::DesigningOutline);
            view.append_plan(fragment);
        };
        let result = with_timeout(
            self.config.request_timeout,
            stream::generate(self.backend.as_ref(), &request, Some(&mut on_chunk)),
        )
        .await;

        match result {
            Ok(plan) => {
                info!(
                    len = plan.full_text.len(),
                    completed = plan.completed,
                    "marketing plan generated"
                );
                view.advance_stage(LoadingStage::Finalizing);
                view.complete_plan(plan.timestamp.as_deref());
                Ok(plan)
            }
            Err(e) => {
                let err = GeneratorError::plan(e);
                error!(
                    error = %err,
                    category = ?err.category(),
                    "marketing plan generation failed"
                );
                view.fail(err.user_message());
                Err(err)
            }
        }
    }

    /// Generate ads, downgrading any failure to an empty list.
    async fn image_branch(
        &self,
        input: &FormInput,
        advice: &serde_json::Value,
        view: &ResultsView,
    ) -> Vec<String> {
        view.begin_images();
        let images = match self.generate_ads(input, advice, view).await {
            Ok(images) => images,
            Err(e) => {
                warn!(
                    error = %e,
                    category = ?e.category(),
                    "ad image generation failed, showing placeholders"
                );
                Vec::new()
            }
        };
        view.finish_images(images.clone());
        images
    }

    async fn generate_ads(
        &self,
        input: &FormInput,
        advice: &serde_json::Value,
        view: &ResultsView,
    ) -> Result<Vec<String>> {
        let request = prompts::image_prompt_request(input, advice);
        let style = with_timeout(
            self.config.request_timeout,
            stream::generate(self.backend.as_ref(), &request, None),
        )
        .await?;

        let ad_style = style.full_text.trim().to_string();
        if ad_style.is_empty() {
            return Err(GeneratorError::InvalidInput(
                "image prompt generation returned no text".into(),
            ));
        }
        ensure_live(view)?;

        let request = AdImageRequest {
            product_description: input.description.clone(),
            product_image: input.image_base64.clone(),
            target_audience: input.audience.clone(),
            ad_style,
            num_prompts: self.config.num_prompts,
        };
        let response = with_timeout(
            self.config.request_timeout,
            self.backend.generate_product_ads(&request),
        )
        .await?;

        info!(count = response.generated_ads.len(), "ad images generated");
        Ok(response.generated_ads)
    }
}

fn ensure_live(view: &ResultsView) -> Result<()> {
    if view.is_live() {
        Ok(())
    } else {
        Err(GeneratorError::Cancelled)
    }
}
