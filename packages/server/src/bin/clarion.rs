//! C.L.A.R.I.O.N. command line
//!
//! Answers one emergency query and prints the reply. With `--json` the
//! whole response, structured data included, is printed instead.

use anyhow::{Context, Result};
use clap::Parser;
use clarion_core::config::Config;
use clarion_core::handle_query;
use clarion_core::kernel::TriageDeps;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "clarion", about = "Triage an emergency request")]
struct Cli {
    /// Print the full response as JSON
    #[arg(long)]
    json: bool,

    /// The request, e.g. "water rising near Houston, we are trapped"
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,clarion_core=debug,contact_extraction=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let deps = TriageDeps::from_config(&config).context("Failed to set up collaborators")?;

    let query = cli.query.join(" ");
    let response = handle_query(&query, &deps).await;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("Failed to serialize response")?
        );
    } else {
        println!("{}", response.response_text);
    }

    Ok(())
}
