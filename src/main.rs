mod cli;
mod config;
mod download;
mod fetch;
mod request;
mod run_log;
mod timeseries;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, create_progress_bar, BarWriter, Cli, Commands};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let pb = create_progress_bar(0, "Downloading...".to_string());

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_writer(BarWriter::new(pb.clone(), std::io::stderr))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let report = match &cli.command {
        Commands::Hourly(args) => command::hourly(args, &pb).await?,
        Commands::ThreeHourly(args) => command::three_hourly(args, &pb).await?,
    };

    let summary = report.summary;
    println!();
    println!("All downloads are completed.");
    println!(
        "{} downloaded, {} failed, {} already present",
        summary.succeeded, summary.failed, summary.skipped
    );
    println!("Total time elapsed: {:.1} minutes", report.minutes);

    Ok(())
}
