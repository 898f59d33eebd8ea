mod app;
mod config;
mod constants;
mod input;
mod store;
mod timeline;
mod ui;

use anyhow::Result;
use std::env;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::Config;

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,convo=debug"));

    // Try to create a log file in the config directory
    let log_file = Config::config_dir()
        .ok()
        .map(|dir| dir.join("convo.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        // Fallback to stderr if file logging fails
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"convo - Terminal conversation timeline

Usage: convo [command]

Commands:
    (none)      Open the demo conversation
    init        Write a default configuration file
    help        Show this help message

Configuration file: ~/.config/convo/config.toml
Logs:               ~/.config/convo/convo.log (RUST_LOG overrides the filter)
"#
    );
}

fn run_init() -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() {
        println!("Configuration already exists at {}", path.display());
        return Ok(());
    }

    let config = Config::default();
    config.ensure_dirs()?;
    config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("init") => run_init(),
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
        None => {
            let config = Config::load()?;
            config.ensure_dirs()?;
            setup_logging();

            crate::ui::theme::init_theme(config.ui.theme);

            let mut app = App::new(config)?;
            app.run().await
        }
    }
}
