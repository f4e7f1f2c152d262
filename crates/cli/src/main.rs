use anyhow::Context;
use clap::{Parser, Subcommand};
use library_db::Backend;
use library_kernel::settings::Settings;
use library_setup::modules::books;

#[derive(Parser, Debug)]
#[command(name = "libraryctl", version, about = "Library database initializer")]
struct Cli {
    /// Storage backend (mongo or memory); overrides settings
    #[arg(long, global = true)]
    backend: Option<Backend>,

    /// MongoDB connection string; overrides settings
    #[arg(long, global = true)]
    uri: Option<String>,

    /// Target database name; overrides settings
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drop the database, recreate collections and indexes, insert fixtures
    Setup,
    /// Print database stats, collection counts and loan/copy findings
    Verify,
    /// Full-text search over book titles, authors and publishers
    Search {
        /// Search terms
        query: String,
    },
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(backend) = self.backend {
            settings.database.backend = backend;
        }
        if let Some(uri) = &self.uri {
            settings.database.uri = uri.clone();
        }
        if let Some(database) = &self.database {
            settings.database.name = database.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load library settings")?;
    cli.apply(&mut settings);
    library_telemetry::init(&settings.telemetry)?;

    let store = library_db::connect(
        settings.database.backend,
        &settings.database.uri,
        &settings.database.name,
    )
    .await
    .with_context(|| format!("failed to open database '{}'", settings.database.name))?;

    match cli.command {
        Command::Setup => {
            let report = library_setup::setup::run(store.as_ref(), &settings).await?;
            println!("{report}");
            println!();
            println!("Setup completed successfully!");
        }
        Command::Verify => {
            let report = library_setup::setup::verify(store.as_ref()).await?;
            println!("{report}");
        }
        Command::Search { query } => {
            let hits = books::search(store.as_ref(), &query).await?;
            tracing::info!(query = %query, hits = hits.len(), "search finished");
            for hit in hits {
                println!(
                    "{:>6.2}  {}  {} ({})",
                    hit.score, hit.book.isbn, hit.book.title, hit.book.publisher
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::parse_from([
            "libraryctl",
            "--backend",
            "memory",
            "--database",
            "library_test",
            "verify",
        ]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.database.backend, Backend::Memory);
        assert_eq!(settings.database.name, "library_test");
        assert_eq!(settings.database.uri, "mongodb://127.0.0.1:27017");
    }
}
