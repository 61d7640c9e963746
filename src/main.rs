use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use dirhound::cli::{Cli, Commands, ScanArgs};
use dirhound::reporter::{ConsoleReporter, ProgressObserver};
use dirhound::scanner::{CancellationToken, Scanner};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan(args).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_scan(args: ScanArgs) -> Result<()> {
    init_tracing(args.verbose);

    let config = args.to_config()?;
    let words = args.load_words()?;
    let scanner = Scanner::new(config)?;

    let reporter = ConsoleReporter::new();
    reporter.print_banner(&args.url, scanner.config(), words.len());

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Stopping, waiting for in-flight requests...".yellow());
            ctrl_c.cancel();
        }
    });

    let progress = ProgressObserver::new(args.verbose);
    let report = scanner.scan(&args.url, &words, &progress, cancel).await?;
    progress.finish();

    reporter.print_results(&report.results);
    reporter.print_important(&report);
    reporter.print_summary(&report);

    Ok(())
}
