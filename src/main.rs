mod agents;
mod config;
mod console;
mod gemini;
mod orchestrator;
mod tools;
mod types;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::console::Console;
use crate::orchestrator::Orchestrator;

#[derive(Debug, Parser)]
struct Args {
    /// Stock ticker to analyze, e.g. TATASTEEL.NS or RELIANCE.NS
    #[arg(long, default_value = "TATASTEEL.NS")]
    ticker: String,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // logging
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter_layer).init();

    tracing::info!("Starting AI Financial Analyst agents");
    Console::display_welcome();

    // config is loaded once here and passed by value; nothing below reads
    // the environment
    let config = Config::load()?;

    let mut orchestrator = match Orchestrator::for_ticker(config, &args.ticker) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            Console::display_error(&e);
            return Err(e);
        }
    };

    Console::display_run_start(args.ticker.trim());
    match orchestrator.run().await {
        Ok(result) => {
            Console::display_result(&result);
            Ok(())
        }
        Err(e) => {
            let e = anyhow::Error::new(e);
            Console::display_error(&e);
            Err(e)
        }
    }
}
