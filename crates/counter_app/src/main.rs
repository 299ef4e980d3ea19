use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use counter_app::{build_router, drive, load_config, EffectRunner, ServerState, StatusHub};
use counter_core::AppState;
use counter_engine::{Poller, RedditSource};
use counter_logging::engine_info;

#[derive(Debug, Parser)]
#[command(version, about = "Watches a counting community for sequence breaks")]
struct Cli {
    /// Path to the RON config file.
    #[arg(long, env = "COUNTER_CONFIG", default_value = "counter.ron")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    counter_logging::initialize(
        config.app.log_destination,
        config.app.level_filter()?,
        &config.app.log_file,
    );
    engine_info!(
        "Starting counter_app v{} watching r/{}",
        env!("CARGO_PKG_VERSION"),
        config.api.community
    );

    let state = AppState::new(config.app.pass_policy);
    let hub = Arc::new(StatusHub::new(state.view()));

    let source = Arc::new(RedditSource::new(config.api.clone())?);
    let events = Poller::new(source, config.app.update_interval()).spawn();
    tokio::spawn(drive(state, events, EffectRunner::new(hub.clone())));

    let router = build_router(ServerState::new(hub), &config.app.static_dir);
    let listener = tokio::net::TcpListener::bind((config.app.host.as_str(), config.app.port))
        .await
        .with_context(|| format!("binding {}:{}", config.app.host, config.app.port))?;
    engine_info!(
        "Listening on http://{}:{}/",
        config.app.host,
        config.app.port
    );

    axum::serve(listener, router).await?;
    Ok(())
}
