use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{HttpOrderClient, OrderClient, OrderDetailPresenter};
use shared::domain::OrderId;

const LOG_ENV: &str = "RUST_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// `RUST_LOG` when set and non-blank, `warn` otherwise.
fn log_filter(from_env: Option<String>) -> String {
    from_env
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "orders-tool", about = "One-shot order backend requests")]
struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:80")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Fetch { order_uid: String },
    Create,
    Delete { order_uid: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(LOG_ENV).ok()))
        .init();

    let client = HttpOrderClient::new(&cli.server_url)
        .with_context(|| format!("cannot use server url '{}'", cli.server_url))?;
    let presenter = OrderDetailPresenter;

    match cli.command {
        Command::List => {
            let ids = client.list_all().await?;
            println!("{}", presenter.render_list(&ids));
        }
        Command::Fetch { order_uid } => {
            let record = client.fetch_by_id(&OrderId::from(order_uid)).await?;
            print!("{}", presenter.render_order(&record));
        }
        Command::Create => {
            let record = client.create().await?;
            print!("{}", presenter.render_created(&record));
        }
        Command::Delete { order_uid } => {
            let id = OrderId::from(order_uid);
            client.delete_by_id(&id).await?;
            print!("{}", presenter.render_deleted(&id));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
