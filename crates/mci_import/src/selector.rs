//! Workspace-wide choice of the default compiler extension.

use crate::error::ImportDiagnostic;
use crate::extension::{CompilerExtension, ExtensionRegistry};
use crate::settings::ImportSettings;
use crate::sink::CompilerConfigurationSink;
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Picks the default extension from the compiler ids declared across the
/// workspace.
///
/// Every project contributes its normalised id, so a project without
/// `compilerId` counts as `javac`. Exactly one distinct id selects its
/// extension. No id, several ids, or an id without a registered extension fall
/// back to the canonical extension.
pub fn select_default<'a, I>(declared_ids: I, registry: &ExtensionRegistry) -> Arc<dyn CompilerExtension>
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: IndexSet<&str> = declared_ids.into_iter().collect();

    match distinct.len() {
        0 => registry.canonical(),
        1 => {
            let id = distinct[0];
            registry.get(id).unwrap_or_else(|| {
                warn!(compiler_id = id, "no compiler extension registered for declared compiler id");
                registry.canonical()
            })
        }
        _ => {
            debug!(
                compiler_ids = ?distinct,
                "modules declare different compiler ids, using the canonical compiler"
            );
            registry.canonical()
        }
    }
}

/// Makes `default` the host's default compiler when auto-detection is on.
///
/// Returns whether the sink was changed. An unregistered backend leaves the
/// sink untouched and is reported as [`ImportDiagnostic::CompilerNotRegistered`].
pub fn apply_default(
    default: &dyn CompilerExtension,
    settings: &ImportSettings,
    sink: &mut dyn CompilerConfigurationSink,
) -> Result<bool, ImportDiagnostic> {
    let wanted = default.backend_compiler_name();
    if !settings.auto_detect_compiler || sink.default_compiler() == Some(wanted) {
        return Ok(false);
    }

    let Some(compiler) = default.backend_compiler(&*sink).map(str::to_string) else {
        return Err(ImportDiagnostic::CompilerNotRegistered {
            extension: default.id().to_string(),
            compiler: wanted.to_string(),
        });
    };

    info!(compiler = %compiler, "switching default compiler");
    sink.set_default_compiler(&compiler);
    Ok(true)
}
