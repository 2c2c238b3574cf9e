use anyhow::Result;
use clap::Parser;
use grid_transformer::cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("grid_transformer=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
