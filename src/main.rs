use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use mark_consolidator::app::{write_statistics, write_summary};
use mark_consolidator::logging;
use mark_consolidator::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "mark-consolidator",
    version,
    about = "Consolidate student mark spreadsheets into a master workbook"
)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Read and validate every student file without touching the master
    #[arg(long)]
    dry_run: bool,

    /// Print discovery statistics and exit
    #[arg(long)]
    stats: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    CliApp::new("mark-consolidator")
        .run(|cancel| run_consolidation(args, cancel))
        .await
}

async fn run_consolidation(args: Args, cancel: CancellationToken) -> Result<Completion, AppError> {
    let config = Config::load(&args.config)?;
    logging::init(&config.logging.level, config.logging.json).map_err(AppError::Logging)?;
    info!(config = %args.config.display(), "Configuration loaded");

    let settings = config.run_settings()?;
    let consolidator = Consolidator::new(CalamineOpener, XlsxMasterStore, settings);
    let stdout = tokio::io::stdout();

    if args.stats {
        let stats = consolidator.statistics().await?;
        write_statistics(&stats, args.json, stdout).await?;
        return Ok(Completion::Success);
    }

    if !args.dry_run {
        config.ensure_directories()?;
    }

    let summary = consolidator.process(cancel, args.dry_run).await?;
    write_summary(&summary, args.json, stdout).await?;

    Ok(match summary.status {
        RunStatus::Cancelled => Completion::Cancelled,
        RunStatus::Completed => Completion::Success,
        RunStatus::CompletedWithFailures | RunStatus::TimedOut | RunStatus::Running => {
            Completion::Failures
        }
    })
}
