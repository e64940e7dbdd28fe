use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HttpOrderClient, UiController};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

mod commands;
mod config;
mod orchestration;

use commands::{parse_command, USAGE};
use orchestration::{dispatch_console_command, run_renderer, Dispatch};

#[derive(Parser, Debug)]
#[command(name = "orders-console", about = "Inspect, create and delete orders")]
struct Args {
    /// Overrides the server url from the config file and environment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings(&args.config);
    if let Some(server_url) = args.server_url {
        settings.server_url = config::normalize_server_url(&server_url);
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let client = HttpOrderClient::new(&settings.server_url)
        .with_context(|| format!("cannot use server url '{}'", settings.server_url))?;
    let controller = UiController::new(Arc::new(client));
    info!(server_url = %settings.server_url, "console: session starting");

    let renderer = tokio::spawn(run_renderer(
        controller.subscribe_events(),
        *controller.presenter(),
    ));
    tokio::spawn({
        let controller = controller.clone();
        async move {
            let _ = controller.start_session().await;
        }
    });

    println!("{USAGE}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read console input")?
    {
        if dispatch_console_command(&controller, parse_command(&line)) == Dispatch::Quit {
            break;
        }
    }

    info!("console: session ended");
    renderer.abort();
    Ok(())
}
