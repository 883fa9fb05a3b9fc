//! Pitchcraft CLI binary entry point.

use clap::Parser;
use pitchcraft::cli::{commands, Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pitchcraft=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Submit(args) => commands::handle_submit(&cli, args),
        Commands::Results(args) => commands::handle_results(&cli, args).await,
        Commands::Generate(args) => {
            commands::handle_generate(&cli, &args.form, &args.output).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}
