use clap::Parser;
use rosterctl::cli::{self, Cli};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    cli::run(Cli::parse())
}
