//! Ratekeeper CLI
//!
//! Queries the configured rate provider through the gateway and prints JSON.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratekeeper_gateway::{Gateway, GatewayConfig};

#[derive(Parser)]
#[command(name = "ratekeeper")]
#[command(author, version, about = "Exchange-rate lookups with caching and circuit breaking", long_about = None)]
struct Cli {
    /// Correlation id attached to every log event for this invocation
    #[arg(long, env = "RATEKEEPER_CORRELATION_ID")]
    correlation_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest rates for a base currency
    Latest {
        /// Base currency (e.g. EUR)
        base: String,
    },
    /// Convert an amount between two currencies
    Convert {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Decimal,
    },
    /// Historical daily rates over a date range
    History {
        /// Base currency (e.g. EUR)
        base: String,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = GatewayConfig::from_env();

    // Initialize logging; stdout is reserved for results
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let gateway = Gateway::from_config(&config)?;
    info!(
        provider = %gateway.provider_name(),
        upstream = %config.engine.upstream.base_url,
        "Gateway ready"
    );

    let correlation_id = cli.correlation_id.as_deref();
    match cli.command {
        Commands::Latest { base } => {
            let snapshot = gateway.latest(correlation_id, &base).await?;
            print_json(snapshot.as_ref())?;
        }
        Commands::Convert { from, to, amount } => {
            let result = gateway.convert(correlation_id, &from, &to, amount).await?;
            print_json(result.as_ref())?;
        }
        Commands::History {
            base,
            start,
            end,
            page,
            page_size,
        } => {
            let page = gateway
                .history(correlation_id, &base, start, end, page, page_size)
                .await?;
            print_json(page.as_ref())?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
