mod batch;
mod cli;

use anyhow::Result;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "client=info,dispatcher=info".into()),
        )
        .init();

    cli::run()
}
