//! LawAID - legal assistant CLI
//!
#![doc = "LawAID - legal assistant CLI"]
#![doc = "Main entry point for the LawAID application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lawaid::cli::{Cli, Commands};
use lawaid::commands;
use lawaid::config::Config;

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
        Commands::Chat { provider } => {
            if let Some(p) = &provider {
                tracing::debug!("Using provider override: {}", p);
            }
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Serve { provider, bind } => {
            tracing::info!("Starting HTTP server");
            if let Some(p) = &provider {
                tracing::debug!("Using provider override: {}", p);
            }
            if let Some(b) = &bind {
                tracing::debug!("Using bind override: {}", b);
            }
            commands::serve::run_serve(config).await?;
            Ok(())
        }
        Commands::Ingest {
            paths,
            chunk_size,
            chunk_overlap,
            output,
        } => {
            tracing::info!("Starting ingestion of {} paths", paths.len());
            commands::ingest::run_ingest(config, paths, chunk_size, chunk_overlap, output).await?;
            Ok(())
        }
        Commands::Complaint => {
            commands::complaint::run_complaint()?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
/// Logs go to stderr so they never mix with answers on stdout.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "lawaid=debug,tower_http=debug" } else { "lawaid=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
