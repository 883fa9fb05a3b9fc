//! CLI command handlers for submit, results and generate.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use std::future::Future;

use tracing::{info, warn};

use super::{Cli, FormArgs, OutputArgs};
use crate::backend::HttpBackend;
use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::orchestrator::{Orchestrator, RunReport};
use crate::storage::{submit_form, FileFormStore, FormStore};
use crate::types::{decode_ad, FormInput};
use crate::view::{AdSlot, EventSink, ResultsView, ViewEvent};

/// Load configuration from `--config` if given, else from the environment.
pub fn load_config(cli: &Cli) -> Result<GeneratorConfig> {
    match &cli.config {
        Some(path) => GeneratorConfig::load(path),
        None => GeneratorConfig::from_env(),
    }
}

pub fn form_store(cli: &Cli) -> FileFormStore {
    match &cli.store_dir {
        Some(dir) => FileFormStore::new(dir.clone()),
        None => FileFormStore::new_default(),
    }
}

/// Handle `pitchcraft submit`.
pub fn handle_submit(cli: &Cli, args: &FormArgs) -> Result<()> {
    let input = read_form(args)?;
    let store = form_store(cli);
    submit_form(&store, &input)?;
    eprintln!(
        "Saved \"{}\" to {}. Run `pitchcraft results` to generate.",
        input.title,
        store.base_dir().display()
    );
    Ok(())
}

/// Handle `pitchcraft results`.
pub async fn handle_results(cli: &Cli, args: &OutputArgs) -> Result<()> {
    let config = load_config(cli)?;
    let store: Arc<dyn FormStore> = Arc::new(form_store(cli));
    let orchestrator = Orchestrator::new(Arc::new(HttpBackend::new(&config)), config);
    let view = mount_terminal_view();

    let report = until_torn_down(&view, orchestrator.run_from_store(store, &view)).await;
    finish(&orchestrator, &view, report, &args.out)
}

/// Handle `pitchcraft generate`: the form is handed over directly.
pub async fn handle_generate(cli: &Cli, form: &FormArgs, output: &OutputArgs) -> Result<()> {
    let config = load_config(cli)?;
    let input = read_form(form)?;
    let orchestrator = Orchestrator::new(Arc::new(HttpBackend::new(&config)), config);
    let view = mount_terminal_view();

    let report = until_torn_down(&view, orchestrator.run(input, &view)).await;
    finish(&orchestrator, &view, report, &output.out)
}

fn read_form(args: &FormArgs) -> Result<FormInput> {
    let input = FormInput::new(&args.title, &args.description, &args.audience)?;
    match &args.image {
        Some(path) => {
            let media_type = media_type_for(path)?;
            let bytes = std::fs::read(path)?;
            Ok(input.with_image_bytes(&bytes, media_type))
        }
        None => Ok(input),
    }
}

fn media_type_for(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ => Err(GeneratorError::InvalidInput(format!(
            "Unsupported image type: {}",
            path.display()
        ))),
    }
}

/// A view that streams the plan to stdout and progress to stderr, torn down
/// on Ctrl-C.
fn mount_terminal_view() -> ResultsView {
    let sink: EventSink = Arc::new(|event| match event {
        ViewEvent::PlanDelta(text) => {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
        other => {
            if let Some(line) = status_line(&other) {
                eprintln!("{line}");
            }
        }
    });
    let view = ResultsView::mount().with_event_sink(sink);

    let scope = view.scope().clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nInterrupted, discarding remaining output.");
                scope.teardown();
            }
            _ = scope.torn_down() => {}
        }
    });
    view
}

/// Progress line for stderr. Failures are left to `main`, which prints the
/// banner once on exit.
fn status_line(event: &ViewEvent) -> Option<String> {
    match event {
        ViewEvent::StageChanged(stage) => Some(format!("… {stage}")),
        ViewEvent::PlanCompleted { timestamp } => {
            Some(format!("\n✔ Plan generated at {timestamp}"))
        }
        ViewEvent::ImagesReady { count } => Some(format!("🖼  {count} ad image(s) ready")),
        ViewEvent::PlanDelta(_) | ViewEvent::Failed { .. } => None,
    }
}

/// Drive `run` until it finishes or the view is torn down, whichever comes
/// first. In-flight requests are dropped on teardown.
async fn until_torn_down<T>(
    view: &ResultsView,
    run: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = view.scope().torn_down() => Err(GeneratorError::Cancelled),
        result = run => result,
    }
}

fn finish(
    orchestrator: &Orchestrator,
    view: &ResultsView,
    report: Result<RunReport>,
    out_dir: &Path,
) -> Result<()> {
    let report = report?;
    view.teardown();

    let state = view.snapshot();
    let expected = orchestrator.config().num_prompts as usize;
    let mut written = 0;
    for (i, slot) in state.ad_slots(expected).into_iter().enumerate() {
        match slot {
            AdSlot::Ready(encoded) => {
                std::fs::create_dir_all(out_dir)?;
                let bytes = match decode_ad(encoded) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(
                            error = %e,
                            category = ?e.category(),
                            slot = i + 1,
                            "skipping undecodable ad image"
                        );
                        eprintln!("  ad {}: image not available", i + 1);
                        continue;
                    }
                };
                let path = out_dir.join(format!("ad-{}.png", i + 1));
                std::fs::write(&path, bytes)?;
                eprintln!("  {}", path.display());
                written += 1;
            }
            AdSlot::Loading | AdSlot::Unavailable => eprintln!("  ad {}: image not available", i + 1),
        }
    }

    info!(
        plan_len = report.plan.full_text.len(),
        images = written,
        "generation finished"
    );
    Ok(())
}
