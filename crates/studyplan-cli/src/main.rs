mod config;
mod generate_cmd;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use studyplan_core::plan::{PlanRelay, PlanRequest};
use studyplan_core::provider::{GeminiProvider, ProviderConfig};

use config::{CliOverrides, StudyplanConfig};

#[derive(Parser)]
#[command(name = "studyplan", about = "AI study plan generator and relay")]
struct Cli {
    /// Provider API key (overrides GEMINI_API_KEY env var)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Provider model (overrides STUDYPLAN_MODEL env var)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Provider call timeout in seconds (overrides STUDYPLAN_TIMEOUT_SECS env var)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a studyplan config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP relay
    Serve {
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// Browser origin allowed to call the relay
        #[arg(long)]
        allowed_origin: Option<String>,
    },
    /// Generate a plan and print it to stdout
    Generate {
        /// What you want to learn
        #[arg(long)]
        goal: String,
        /// Total time budget (e.g. "2 weeks")
        #[arg(long)]
        duration: String,
        /// When you can study (e.g. "weekday evenings")
        #[arg(long)]
        time_slots: String,
        /// Print the JSON response envelope instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Execute the `studyplan init` command: write config file.
fn cmd_init(cli: &CliOverrides, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let Some(api_key) = cli.api_key.clone().filter(|k| !k.trim().is_empty()) else {
        anyhow::bail!("`studyplan init` requires --api-key");
    };

    let cfg = config::ConfigFile {
        provider: config::ProviderSection {
            api_key: Some(api_key),
            model: cli.model.clone(),
            base_url: None,
            timeout_secs: cli.timeout_secs,
        },
        server: config::ServerSection::default(),
    };

    config::save_config_to(&path, &cfg)?;

    println!("Config written to {}", path.display());
    println!("  provider.api_key = <set>");
    if let Some(model) = &cfg.provider.model {
        println!("  provider.model = {model}");
    }
    println!();
    println!("Next: run `studyplan serve` to start the relay.");

    Ok(())
}

/// Build the relay from resolved provider settings.
fn build_relay(provider: ProviderConfig) -> anyhow::Result<Arc<PlanRelay>> {
    let provider = GeminiProvider::new(provider).context("failed to initialise Gemini provider")?;
    Ok(Arc::new(PlanRelay::new(Arc::new(provider))))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut overrides = CliOverrides {
        api_key: cli.api_key,
        model: cli.model,
        timeout_secs: cli.timeout,
        ..Default::default()
    };

    match cli.command {
        Commands::Init { force } => {
            cmd_init(&overrides, force)?;
        }
        Commands::Serve {
            bind,
            port,
            allowed_origin,
        } => {
            overrides.bind = bind;
            overrides.port = port;
            overrides.allowed_origin = allowed_origin;
            // A missing API key fails here, before any socket is bound.
            let resolved = StudyplanConfig::resolve(&overrides)?;
            tracing::debug!(provider = ?resolved.provider, "resolved provider config");
            let relay = build_relay(resolved.provider)?;
            serve_cmd::run_serve(relay, &resolved.server).await?;
        }
        Commands::Generate {
            goal,
            duration,
            time_slots,
            json,
        } => {
            let resolved = StudyplanConfig::resolve(&overrides)?;
            let relay = build_relay(resolved.provider)?;
            let request = PlanRequest::new(goal, duration, time_slots);
            generate_cmd::run_generate(&relay, &request, json).await?;
        }
    }

    Ok(())
}
