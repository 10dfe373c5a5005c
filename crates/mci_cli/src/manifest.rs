use std::fs;
use std::path::{Path, PathBuf};

use mci_import::{ImportSettings, InMemoryCompilerConfiguration, ModuleGroup, ModuleRef};
use mci_maven::{MavenProject, PomError, default_modules};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::render::error_chain;

/// Default manifest file name looked up by the CLI.
pub const MANIFEST_FILE: &str = "mci.toml";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest {}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to load project {}", path.display())]
    Pom {
        path: PathBuf,
        #[source]
        source: PomError,
    },
}

/// Workspace description consumed by `mci import`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceManifest {
    #[serde(default)]
    pub import: ImportSettings,
    #[serde(default)]
    pub ide: IdeSection,
    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectEntry>,
}

/// Initial state of the host compiler configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdeSection {
    pub default_compiler: Option<String>,
    pub registered_compilers: Vec<String>,
}

impl Default for IdeSection {
    fn default() -> Self {
        Self {
            default_compiler: Some("Javac".to_string()),
            registered_compilers: vec!["Javac".to_string(), "Eclipse".to_string()],
        }
    }
}

/// Projects loaded from a manifest, plus the ones that failed to load.
#[derive(Debug, Default)]
pub struct LoadedWorkspace {
    pub groups: Vec<ModuleGroup>,
    pub skipped: Vec<ManifestError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectEntry {
    /// Path to the `pom.xml`, relative to the manifest.
    pub pom: PathBuf,
    /// IDE modules; derived from the pom when omitted.
    pub modules: Option<Vec<ModuleRef>>,
}

impl WorkspaceManifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    pub fn parse(contents: &str, path: &Path) -> Result<Self, ManifestError> {
        toml::from_str(contents).map_err(|source| ManifestError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads every listed pom, resolving paths against `base`.
    ///
    /// A pom that cannot be read or parsed is skipped and reported; the rest
    /// of the workspace is still loaded.
    pub fn workspace(&self, base: &Path) -> LoadedWorkspace {
        let mut loaded = LoadedWorkspace::default();
        for entry in &self.projects {
            let path = base.join(&entry.pom);
            let project = match MavenProject::load(&path) {
                Ok(project) => project,
                Err(source) => {
                    let error = ManifestError::Pom { path, source };
                    warn!(error = %error_chain(&error), "skipping project");
                    loaded.skipped.push(error);
                    continue;
                }
            };
            let modules = entry
                .modules
                .clone()
                .unwrap_or_else(|| default_modules(&project));
            loaded.groups.push(ModuleGroup::new(project, modules));
        }
        loaded
    }

    /// Fresh host configuration described by the `[ide]` section.
    pub fn initial_configuration(&self) -> InMemoryCompilerConfiguration {
        let configuration = InMemoryCompilerConfiguration::new(self.ide.registered_compilers.clone());
        match &self.ide.default_compiler {
            Some(compiler) => configuration.with_default_compiler(compiler.clone()),
            None => configuration,
        }
    }
}
