//! Pitchcraft — streaming AI marketing generator client
//!
//! Hands a product description to a marketing backend, streams the generated
//! Markdown plan as it arrives, and collects generated ad images on an
//! isolated branch that can fail without affecting the plan.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pitchcraft::prelude::*;
//!
//! # async fn example() -> pitchcraft::error::Result<()> {
//! let config = GeneratorConfig::from_env()?;
//! let backend = Arc::new(HttpBackend::new(&config));
//! let orchestrator = Orchestrator::new(backend, config);
//!
//! let input = FormInput::new("Trail Mix", "Crunchy and sweet", "Hikers")?;
//! let view = ResultsView::mount();
//! let report = orchestrator.run(input, &view).await?;
//! println!("{}", report.plan.full_text);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prelude;
pub mod storage;
pub mod stream;
pub mod types;
pub mod util;
pub mod view;

#[cfg(feature = "cli")]
pub mod cli;
