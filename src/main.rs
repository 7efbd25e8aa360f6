use std::{io, process::ExitCode};

use clap::Parser;
use qfx_convert::cli::{self, Cli};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let cli = Cli::parse();

    let stdout = io::stdout();
    let stderr = io::stderr();
    cli::run(&cli, &mut stdout.lock(), &mut stderr.lock()).into()
}
