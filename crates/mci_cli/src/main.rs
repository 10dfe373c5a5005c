mod manifest;
mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mci_import::{
    CompilerImporter, ExtensionRegistry, InMemoryCompilerConfiguration, has_unresolved_placeholder,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::manifest::{MANIFEST_FILE, WorkspaceManifest};
use crate::render::ImportSummary;

const LOG_ENV: &str = "MCI_LOG";

#[derive(Parser, Debug)]
#[command(name = "mci")]
#[command(about = "Import Maven compiler settings into an IDE compiler configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one import pass over the projects listed in a manifest
    Import {
        /// Workspace manifest, or a directory containing mci.toml
        manifest: PathBuf,
        /// JSON file holding the compiler configuration between runs
        #[arg(long)]
        state: Option<PathBuf>,
        /// Emit machine-readable JSON instead of a human table
        #[arg(long)]
        json: bool,
    },
    /// Report whether texts contain an unresolved `${...}` placeholder
    Scan {
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

fn main() {
    init_logging();
    if let Err(error) = real_main() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Import {
            manifest,
            state,
            json,
        } => run_import(&manifest, state.as_deref(), json),
        Commands::Scan { texts } => {
            for text in texts {
                let status = if has_unresolved_placeholder(&text) {
                    "unresolved"
                } else {
                    "resolved"
                };
                println!("{status}\t{text}");
            }
            Ok(())
        }
    }
}

fn run_import(manifest_path: &Path, state: Option<&Path>, json: bool) -> Result<()> {
    let manifest_path = if manifest_path.is_dir() {
        manifest_path.join(MANIFEST_FILE)
    } else {
        manifest_path.to_path_buf()
    };
    let manifest = WorkspaceManifest::load(&manifest_path)?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let workspace = manifest.workspace(base);

    let mut configuration = match state {
        Some(path) if path.exists() => load_state(path, &manifest)?,
        _ => manifest.initial_configuration(),
    };

    let mut importer = CompilerImporter::new(ExtensionRegistry::builtin(), manifest.import);
    let (default, report) = importer.run(&workspace.groups, None, &mut configuration);

    if let Some(path) = state {
        save_state(path, &configuration)?;
    }

    let summary = ImportSummary::new(&default, &report, &configuration, &workspace.skipped);
    if json {
        let payload =
            serde_json::to_string_pretty(&summary).context("failed to serialize import summary")?;
        println!("{payload}");
    } else {
        print!("{}", render::render_summary(&summary));
    }
    Ok(())
}

// The manifest owns the registered compiler list; the state file only
// carries what earlier passes wrote.
fn load_state(path: &Path, manifest: &WorkspaceManifest) -> Result<InMemoryCompilerConfiguration> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    let mut configuration: InMemoryCompilerConfiguration = serde_json::from_str(&contents)
        .with_context(|| format!("invalid state file {}", path.display()))?;
    configuration.registered_compilers = manifest.ide.registered_compilers.iter().cloned().collect();
    debug!(path = %path.display(), "loaded compiler configuration state");
    Ok(configuration)
}

fn save_state(path: &Path, configuration: &InMemoryCompilerConfiguration) -> Result<()> {
    let payload = serde_json::to_string_pretty(configuration)
        .context("failed to serialize compiler configuration")?;
    fs::write(path, payload)
        .with_context(|| format!("failed to write state file {}", path.display()))
}
