#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use claim_watcher::core::alerts::model::AlertTrigger;
use claim_watcher::core::audio::player::RodioPlayer;
use claim_watcher::core::config::{ConfigManager, Settings};
use claim_watcher::core::coordinator::Coordinator;
use claim_watcher::core::feed;
use claim_watcher::core::host::LocalHost;

/// Plays alert sounds for a stream of chat channel events.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Directory holding settings.json
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// JSON file with the initial channel directory
    #[arg(long)]
    directory: Option<PathBuf>,

    /// Newline-delimited JSON events; stdin when omitted
    #[arg(long)]
    events: Option<PathBuf>,

    /// Play the configured sound of each trigger and exit
    #[arg(long)]
    preview: bool,
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

    let mut config_manager = ConfigManager::new(&cli.config_dir);
    let settings: Arc<Mutex<Settings>> = Arc::new(Mutex::new(config_manager.load()));
    log::info!("Settings: {}", config_manager.path().display());

    let host = match &cli.directory {
        Some(path) => LocalHost::load(path)?,
        None => LocalHost::new(),
    };

    let mut coordinator = Coordinator::new(host, Arc::clone(&settings), RodioPlayer::new());

    if cli.preview {
        for trigger in AlertTrigger::all() {
            log::info!("Previewing {}", trigger.display_name());
            coordinator.preview(*trigger);
            tokio::time::sleep(Duration::from_millis(700)).await;
        }
        return Ok(());
    }

    let (tx, mut rx) = mpsc::channel(256);
    let reader = match &cli.events {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening event file {}", path.display()))?;
            tokio::spawn(feed::pump(BufReader::new(file), tx))
        }
        None => tokio::spawn(feed::pump(BufReader::new(tokio::io::stdin()), tx)),
    };

    // The coordinator stays on this task: the audio stream is not Send
    coordinator
        .run(&mut rx, Duration::from_secs(1), || {
            if let Some(reloaded) = config_manager.reload_if_changed() {
                log::info!("Settings reloaded");
                match settings.lock() {
                    Ok(mut current) => *current = reloaded,
                    Err(poisoned) => *poisoned.into_inner() = reloaded,
                }
            }
        })
        .await;

    let forwarded = reader.await?.context("reading events")?;
    log::info!("Processed {} events", forwarded);
    Ok(())
}
