//! Mailsweep binary entry point.

use clap::Parser;
use mailsweep::cli::{Cli, Commands};
use mailsweep::config::{Paths, ScanSettings};
use mailsweep::output;
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    };

    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = match &cli.config {
        Some(path) => ScanSettings::load_from(path)?,
        None => ScanSettings::load()?,
    };

    match cli.command {
        Commands::Scan(cmd) => cmd.execute(settings, cli.verbose, cli.quiet).await?,
        Commands::Export(cmd) => cmd.execute(cli.quiet)?,
    }

    Ok(())
}

/// Log to stderr and, when it can be opened, to the execution log file.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "mailsweep=debug"
    } else {
        "mailsweep=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = File::options()
        .create(true)
        .append(true)
        .open(Paths::get().log_file())
        .ok()
        .map(|file| fmt::layer().with_ansi(false).with_writer(Arc::new(file)));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}
