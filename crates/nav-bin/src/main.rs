use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use nav_core::config::EngineConfig;
use nav_core::monitor::ChangeMonitor;
use nav_core::session::Session;

#[derive(Parser, Debug)]
#[command(name = "fsnav")]
#[command(about = "Native file-navigation and command engine")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(long, env = "FSNAV_CONFIG_PATH")]
    config_path: Option<String>,

    /// Log level (trace, debug, info, warn, error); logs go to stderr
    #[arg(long, default_value = "warn", env = "FSNAV_LOG")]
    log_level: String,

    /// Starting directory for the session (overrides config start_path)
    #[arg(long)]
    cwd: Option<String>,

    /// Command: list, cd, search, info, mkdir, delete, copy, move, rename,
    /// pwd, diskinfo, watch
    command: String,

    /// Command arguments, passed through verbatim
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout is reserved for JSON replies; all logging goes to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config_path = cli
        .config_path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(EngineConfig::default_path);

    let mut config = if config_path.exists() {
        info!("loading config from {}", config_path.display());
        EngineConfig::load(&config_path)?
    } else {
        EngineConfig::default()
    };

    if let Some(cwd) = cli.cwd {
        config.start_path = Some(cwd);
    }

    if cli.command == "watch" {
        return run_watch(config, &cli.args).await;
    }

    let mut session = Session::new(config);
    let reply = session.dispatch(&cli.command, &cli.args);
    println!("{}", serde_json::to_string(&reply)?);

    // Recoverable failures already came out as an error payload; exit 0
    // so wrappers can rely on parsing stdout
    Ok(())
}

/// Long-running mode: print change events for one directory as JSON lines
/// until Ctrl+C.
async fn run_watch(config: EngineConfig, args: &[String]) -> Result<()> {
    let session = Session::new(config.clone());
    let target = args
        .first()
        .map(|p| nav_core::paths::resolve(session.current_path(), p))
        .unwrap_or_else(|| session.current_path().to_path_buf());

    let (monitor, mut events) = ChangeMonitor::start(&target, config.monitor_queue_capacity)
        .with_context(|| format!("cannot watch {}", target.display()))?;

    info!("watching {} — Ctrl+C to stop", target.display());

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(event) => println!("{}", serde_json::to_string(&event)?),
                    None => {
                        info!("watch loop ended");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received Ctrl+C, stopping watch");
                monitor.shutdown().await;
                break;
            }
        }
    }

    Ok(())
}
