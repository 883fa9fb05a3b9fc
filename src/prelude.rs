//! Convenience re-exports for common use.

pub use crate::backend::{HttpBackend, MarketingBackend};
pub use crate::config::GeneratorConfig;
pub use crate::error::{GeneratorError, Result};
pub use crate::orchestrator::{Orchestrator, RunReport};
pub use crate::storage::{FileFormStore, FormStore, MemoryFormStore};
pub use crate::types::{
    AggregateResult, FormInput, GenerationRequest, ImageData, StreamEvent,
};
pub use crate::view::{EventSink, ResultsState, ResultsView, ViewEvent, ViewScope};
