use std::path::PathBuf;
use thiserror::Error;

/// Non-fatal problems recorded during an import pass.
///
/// None of these stop the pass; each one comes with a fallback that has
/// already been applied by the time it is reported.
#[derive(Debug, Error)]
pub enum ImportDiagnostic {
    #[error(
        "compiler '{compiler}' required by compiler id '{extension}' is not registered; keeping the current default compiler"
    )]
    CompilerNotRegistered { extension: String, compiler: String },

    #[error("could not inspect '{}' for archetype resources", path.display())]
    ResourcePathUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImportDiagnostic {
    /// Whether the host should surface this entry as a configuration error.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, ImportDiagnostic::CompilerNotRegistered { .. })
    }
}
