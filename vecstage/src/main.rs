use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vecstage::{Settings, SettingsOverrides, VectorStore};
use vecstage_core::IdDiff;

#[derive(Parser)]
#[command(
    name = "vecstage",
    version,
    about = "Stage precomputed embeddings from Parquet into a Pinecone index"
)]
struct Cli {
    /// TOML settings file; flags and env vars override its values.
    #[arg(long, global = true, env = "VECSTAGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: SettingsOverrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Create the index if it does not exist.
    Init,
    /// Upload the staging file.
    Upload,
    /// Compare staged ids with the ids in an existing index.
    Validate,
    /// Init, upload, then validate.
    Run,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        Settings::load(self.config.as_deref(), &self.overrides).with_context(|| {
            match &self.config {
                Some(path) => format!("loading settings from {}", path.display()),
                None => "loading settings".to_string(),
            }
        })
    }
}

fn print_diff(diff: &IdDiff) {
    if diff.is_clean() {
        println!("All staged ids are present in the index.");
        return;
    }
    println!(
        "{} staged ids missing from the index:",
        diff.missing_from_remote.len()
    );
    for id in &diff.missing_from_remote {
        println!("  - {id}");
    }
    println!(
        "{} ids in the index not present in the staging file:",
        diff.unexpected_in_remote.len()
    );
    for id in &diff.unexpected_in_remote {
        println!("  + {id}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let control = settings.pinecone_control()?;
    let mut store = VectorStore::new(control, settings)?;

    match cli.command {
        Command::Init => {
            store.initialize_index().await?;
        }
        Command::Upload => {
            store.initialize_index().await?;
            let summary = store.staging_to_vector_store().await?;
            println!(
                "Uploaded {} rows in {} batches ({} used the page content fallback).",
                summary.rows, summary.batches, summary.fallbacks
            );
        }
        Command::Validate => {
            store.connect_index().await?;
            let diff = store.validate_index().await?;
            print_diff(&diff);
        }
        Command::Run => {
            let report = store.run().await?;
            println!(
                "Uploaded {} rows in {} batches ({} used the page content fallback).",
                report.upload.rows, report.upload.batches, report.upload.fallbacks
            );
            print_diff(&report.diff);
        }
    }

    Ok(())
}
