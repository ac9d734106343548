use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use bellows::config::Config;
use bellows::fediverse::registry::ClientRegistry;
use bellows::pipeline::cycle::{run_cycle, CycleReport};
use bellows::profile;
use bellows::scheduler::Scheduler;
use bellows::trending::sources::FederatedSources;

/// Bellows: boosts trending posts from subscribed fediverse instances.
///
/// Polls the trending feeds of the configured Mastodon and Pixelfed
/// instances and reshares eligible posts from the home account.
#[derive(Parser)]
#[command(name = "bellows", version, about)]
struct Cli {
    /// Path to the auth file (home account credentials)
    #[arg(long, default_value = "config/auth.yaml")]
    auth: PathBuf,

    /// Path to the settings file (schedule, instances, filters)
    #[arg(long, default_value = "config/config.yaml")]
    config: PathBuf,

    /// Directory for persisted client credentials
    #[arg(long, default_value = "secrets")]
    secrets: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, refresh the profile, then boost on the configured interval
    Run,

    /// Run a single boost cycle and exit
    Once,

    /// Refresh the bot profile and exit
    UpdateProfile,

    /// Load the configuration, print a summary, and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Config must load before logging — it carries the log level.
    let config = Config::load(&cli.auth, &cli.config)?;
    init_tracing(&config.log_level);
    info!("Config loaded");

    match cli.command {
        Commands::CheckConfig => {
            println!("Home account: {}", config.bot_account.server);
            println!("Interval: {} minutes", config.interval);
            println!("Startup delay: {} seconds", config.delay);
            println!("Subscribed instances:");
            for instance in &config.subscribed_instances {
                println!(
                    "  {} (top {}, {:?}{})",
                    instance.name,
                    instance.limit,
                    instance.software,
                    if instance.boost_only_media {
                        ", media only"
                    } else {
                        ""
                    },
                );
            }
            println!("Filtered servers: {}", config.filtered_servers.len());
        }

        Commands::UpdateProfile => {
            let registry = ClientRegistry::new(&cli.secrets);
            let home = registry.home_client(&config.bot_account).await?;
            profile::update_profile(&home, &config).await?;
            println!("Profile updated for {}", config.bot_account.server);
        }

        Commands::Once => {
            let registry = Arc::new(ClientRegistry::new(&cli.secrets));
            let home = registry.home_client(&config.bot_account).await?;
            let sources = FederatedSources::new(Arc::clone(&registry));

            let report = run_cycle(
                home.as_ref(),
                &sources,
                &config.subscribed_instances,
                &config.filtered_servers,
            )
            .await;
            log_report(&report);
        }

        Commands::Run => {
            if config.delay > 0 {
                info!(
                    seconds = config.delay,
                    "Delaying startup by {} seconds", config.delay
                );
                tokio::time::sleep(Duration::from_secs(config.delay)).await;
            }

            let registry = Arc::new(ClientRegistry::new(&cli.secrets));
            let home = registry.home_client(&config.bot_account).await?;
            profile::update_profile(&home, &config).await?;

            let sources = Arc::new(FederatedSources::new(Arc::clone(&registry)));
            let config = Arc::new(config);
            let scheduler = Scheduler::new(config.interval);

            scheduler
                .run(|| {
                    let home = Arc::clone(&home);
                    let sources = Arc::clone(&sources);
                    let config = Arc::clone(&config);
                    async move {
                        let report = run_cycle(
                            home.as_ref(),
                            sources.as_ref(),
                            &config.subscribed_instances,
                            &config.filtered_servers,
                        )
                        .await;
                        log_report(&report);
                    }
                })
                .await;
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(format!("bellows={log_level}"))
                }),
        )
        .init();
}

fn log_report(report: &CycleReport) {
    info!(
        boosted = report.boosted(),
        skipped = report.skipped(),
        failed_instances = report.failed_instances(),
        "Cycle complete"
    );
}
