mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "samgraft",
    about = "Package Chalice apps and graft their SAM templates into a CDK asset tree"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Package the Chalice app for a stage and write the rewritten template
    Package(commands::PackageArgs),
    /// Create samgraft.toml in the current directory
    Init,
    /// Check chalice, the Chalice config store, and Docker
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Package(args) => commands::package(args).await?,
        Commands::Init => commands::init_project().await?,
        Commands::Doctor => commands::doctor().await?,
    }

    Ok(())
}
