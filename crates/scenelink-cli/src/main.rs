//! `scenelink` – relays tracked robot poses into a shared XR scene.
//!
//! 1. Loads `~/.scenelink/config.toml`, writing the defaults on first run.
//! 2. Connects to the scene (or an in-memory one with `dry_run`).
//! 3. Registers the tracked objects, then runs the publish loop, the
//!    interaction pump and the HTTP gateway side by side.
//! 4. Ctrl-C stops all three and exits.

mod config;

use std::sync::Arc;

use colored::Colorize;
use scenelink_gateway::GatewayServer;
use scenelink_middleware::{RecordingScene, SceneClient, WsSceneClient};
use scenelink_runtime::{Relay, init_tracing};
use scenelink_types::{InteractionMode, RelayError};
use tokio::sync::watch;
use tracing::{error, warn};

use crate::config::ConfigSource;

fn main() {
    // Installed before the runtime exists; see `init_tracing`.
    let _guard = init_tracing("scenelink");

    print_banner();

    let (cfg, source) = config::load();
    let path = config::config_path().display().to_string();
    match source {
        ConfigSource::File => println!("  Config loaded from {}", path.bold()),
        ConfigSource::Created => println!(
            "  {} Default config written to {}",
            "✓".green().bold(),
            path.bold()
        ),
        ConfigSource::CreateFailed(e) => println!("{}: {}", "Error saving config".red(), e),
        ConfigSource::Fallback(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
        }
    }
    print_summary(&cfg);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "  Ctrl-C received, shutting down …".yellow().bold());
        shutdown_tx.send_replace(true);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler; graceful shutdown unavailable");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start tokio runtime");
            std::process::exit(1);
        }
    };

    match runtime.block_on(run(cfg, shutdown_rx)) {
        Ok(()) => println!("{}", "  ✓ Relay stopped.".green()),
        Err(e) => {
            error!(error = %e, "relay failed");
            println!("{}: {}", "Relay failed".red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cfg: config::Config, shutdown: watch::Receiver<bool>) -> Result<(), RelayError> {
    let relay_config = cfg.to_relay_config()?;

    let scene: Arc<dyn SceneClient> = if cfg.dry_run {
        Arc::new(RecordingScene::new())
    } else {
        Arc::new(WsSceneClient::connect(&cfg.scene_url()).await?)
    };

    let relay = Arc::new(Relay::new(relay_config, scene));
    let gateway = GatewayServer::new(Arc::clone(&relay)).with_port(cfg.http_port);

    tokio::try_join!(relay.run(shutdown.clone()), gateway.run(shutdown))?;
    Ok(())
}

fn print_summary(cfg: &config::Config) {
    let scene = if cfg.dry_run {
        "dry run (in-memory scene)".yellow().to_string()
    } else {
        cfg.scene_url().bold().to_string()
    };
    let mode = match cfg.interaction_mode {
        InteractionMode::None => "relay only",
        InteractionMode::HeadGaze => "head gaze",
        InteractionMode::Hand => "hand",
    };
    println!();
    println!("  Scene        {scene}");
    println!("  Gateway      http://0.0.0.0:{}", cfg.http_port);
    println!("  Objects      {}", cfg.objects.len());
    println!("  Interaction  {}", mode.cyan());
    println!("  Interval     {} ms", cfg.publish_interval_ms);
    println!();
}

fn print_banner() {
    println!();
    println!("{}", r#"   ____                    __    _      __  "#.bold().cyan());
    println!("{}", r#"  / __/______ ___  ___    / /   (_)__  / /__"#.bold().cyan());
    println!("{}", r#" _\ \/ __/ -_) _ \/ -_)  / /__ / / _ \/  '_/"#.bold().cyan());
    println!("{}", r#"/___/\__/\__/_//_/\__/  /____//_/_//_/_/\_\ "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "SceneLink".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Robot pose relay for shared XR scenes");
    println!();
}
