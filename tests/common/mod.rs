//! Shared test helpers and mock backend.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use pitchcraft::backend::{ByteStream, MarketingBackend};
use pitchcraft::error::{GeneratorError, Result};
use pitchcraft::orchestrator::prompts::PLAN_SYSTEM_PROMPT;
use pitchcraft::types::{
    AdImageRequest, AdImageResponse, AdviceRequest, FormInput, GenerationRequest,
};

/// `data: <json>\n\n` frame for a chunk event.
pub fn chunk_frame(content: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"type": "chunk", "content": content})
    )
}

/// `data: <json>\n\n` frame for a complete event.
pub fn complete_frame(timestamp: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"type": "complete", "timestamp": timestamp})
    )
}

pub fn sample_input() -> FormInput {
    FormInput::new("Trail Mix", "Crunchy and sweet", "Hikers").unwrap()
}

/// Called with the index of the plan buffer the consumer just finished with.
pub type PlanHook = Arc<dyn Fn(usize) + Send + Sync>;

/// A backend that serves canned responses and records which endpoints were
/// called.
pub struct MockBackend {
    advice: std::result::Result<serde_json::Value, u16>,
    plan_buffers: Vec<String>,
    image_prompt_buffers: Vec<String>,
    ads: std::result::Result<Vec<String>, u16>,
    plan_hook: Option<PlanHook>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            advice: Ok(serde_json::json!({"tips": ["use humor"]})),
            plan_buffers: vec![chunk_frame("# Plan\n"), complete_frame("t")],
            image_prompt_buffers: vec![chunk_frame("sunlit trail"), complete_frame("t")],
            ads: Ok(vec!["aGk=".to_string()]),
            plan_hook: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_plan_buffers(mut self, buffers: Vec<String>) -> Self {
        self.plan_buffers = buffers;
        self
    }

    pub fn with_ads_status(mut self, status: u16) -> Self {
        self.ads = Err(status);
        self
    }

    pub fn with_plan_hook(mut self, hook: PlanHook) -> Self {
        self.plan_hook = Some(hook);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

fn status_error(status: u16) -> GeneratorError {
    GeneratorError::status(reqwest::StatusCode::from_u16(status).unwrap())
}

#[async_trait]
impl MarketingBackend for MockBackend {
    async fn search_selling_advice(&self, _request: &AdviceRequest) -> Result<serde_json::Value> {
        self.record("advice");
        self.advice.clone().map_err(|status| GeneratorError::AdviceFetch {
            status,
            message: "mock failure".into(),
        })
    }

    async fn open_generation(&self, request: &GenerationRequest) -> Result<ByteStream> {
        if request.system_prompt == PLAN_SYSTEM_PROMPT {
            self.record("plan");
            let buffers = self.plan_buffers.clone();
            let hook = self.plan_hook.clone();
            let stream = async_stream::stream! {
                for (i, buffer) in buffers.into_iter().enumerate() {
                    yield Ok::<_, GeneratorError>(Bytes::from(buffer));
                    if let Some(hook) = &hook {
                        hook(i);
                    }
                }
            };
            Ok(stream.boxed())
        } else {
            self.record("image_prompt");
            let buffers = self.image_prompt_buffers.clone();
            Ok(futures::stream::iter(buffers.into_iter().map(|b| Ok::<_, GeneratorError>(Bytes::from(b)))).boxed())
        }
    }

    async fn generate_product_ads(&self, _request: &AdImageRequest) -> Result<AdImageResponse> {
        self.record("ads");
        self.ads
            .clone()
            .map(|generated_ads| AdImageResponse { generated_ads })
            .map_err(status_error)
    }
}
