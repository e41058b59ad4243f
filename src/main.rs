//! Benoît - robot French tutor CLI
//!
#![doc = "Benoît - robot French tutor CLI"]
#![doc = "Main entry point for the Benoît application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use benoit::cli::{Cli, Commands};
use benoit::commands;
use benoit::commands::chat::StartMode;
use benoit::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat => {
            tracing::info!("Starting free conversation");
            commands::chat::run_chat(config, StartMode::FreeChat).await?;
            Ok(())
        }
        Commands::Lesson { id } => {
            tracing::info!("Starting lesson {}", id);
            commands::chat::run_chat(config, StartMode::Lesson(id)).await?;
            Ok(())
        }
        Commands::Lessons { json } => {
            tracing::debug!("Listing lessons");
            commands::lessons::list_lessons(json)?;
            Ok(())
        }
        Commands::Speak { text } => {
            tracing::info!("Starting one-off speech playback");
            commands::speak::run_speak(config, text).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins over the verbosity flag. Logs go to stderr so command
/// output on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "benoit=debug" } else { "benoit=info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
