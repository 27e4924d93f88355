use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Operator commands for the Bookshelf service
#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Create or update the database schema, then exit
    Migrate,
    /// Print the effective settings with secrets masked
    Settings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load Bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => bookshelf::app::serve(settings).await,
        Command::Migrate => {
            let applied = bookshelf::app::migrate(&settings).await?;
            tracing::info!(applied, "schema up to date");
            Ok(())
        }
        Command::Settings => {
            println!("{:#?}", settings.redacted());
            Ok(())
        }
    }
}
