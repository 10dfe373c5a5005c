//! Two-phase import pass over a whole workspace.
//!
//! Phase 1 ([`CompilerImporter::compute_default`]) reduces the declared
//! compiler ids to one default extension. The caller may keep the returned
//! [`DefaultCompiler`] and hand it back on the next pass. Phase 2
//! ([`CompilerImporter::apply`]) pushes the default into the host, writes
//! every module's options and bytecode target, then drops settings of modules
//! that left the workspace.

use crate::arguments;
use crate::error::ImportDiagnostic;
use crate::extension::{CompilerExtension, ExtensionRegistry};
use crate::extract::{compiler_id, extract};
use crate::model::{ModuleGroup, ModuleRef, ProjectDescriptor};
use crate::selector::{apply_default, select_default};
use crate::settings::ImportSettings;
use crate::sink::{CompilerConfigurationSink, ExcludeEntry, ImportNotification};
use crate::target_level::{self, TargetLevelSource};
use indexmap::IndexSet;
use serde::Serialize;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

const ARCHETYPE_RESOURCES: [&str; 4] = ["src", "main", "resources", "archetype-resources"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPhase {
    Idle,
    ComputingDefault,
    ApplyingDefault,
    ConfiguringModules,
    ReconcilingStale,
}

/// Workspace default compiler chosen in phase 1.
#[derive(Clone)]
pub struct DefaultCompiler {
    extension: Arc<dyn CompilerExtension>,
}

impl DefaultCompiler {
    pub fn new(extension: Arc<dyn CompilerExtension>) -> Self {
        Self { extension }
    }

    pub fn extension(&self) -> &Arc<dyn CompilerExtension> {
        &self.extension
    }

    pub fn id(&self) -> &str {
        self.extension.id()
    }
}

impl fmt::Debug for DefaultCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DefaultCompiler").field(&self.id()).finish()
    }
}

/// Settings written for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleOutcome {
    pub module: String,
    pub project: String,
    pub compiler_id: String,
    pub backend: String,
    pub options: Vec<String>,
    pub target: String,
    pub target_source: TargetLevelSource,
}

/// What a pass did, for logging and for callers that render results.
#[derive(Debug, Default)]
pub struct PassReport {
    pub phases: Vec<ImportPhase>,
    pub default_changed: bool,
    pub modules: Vec<ModuleOutcome>,
    pub removed_modules: Vec<String>,
    pub notifications: Vec<ImportNotification>,
    pub diagnostics: Vec<ImportDiagnostic>,
}

impl PassReport {
    pub fn module(&self, name: &str) -> Option<&ModuleOutcome> {
        self.modules.iter().find(|outcome| outcome.module == name)
    }
}

/// Drives the import pass. Holds the extension registry and the host toggles.
pub struct CompilerImporter {
    registry: ExtensionRegistry,
    settings: ImportSettings,
    phase: ImportPhase,
}

impl CompilerImporter {
    pub fn new(registry: ExtensionRegistry, settings: ImportSettings) -> Self {
        Self {
            registry,
            settings,
            phase: ImportPhase::Idle,
        }
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    fn enter(&mut self, phase: ImportPhase, report: Option<&mut PassReport>) {
        debug!(from = ?self.phase, to = ?phase, "import phase transition");
        self.phase = phase;
        if let Some(report) = report {
            report.phases.push(phase);
        }
    }

    /// Phase 1: returns `cached` untouched, or selects the default from every
    /// project's declared compiler id.
    pub fn compute_default(
        &mut self,
        workspace: &[ModuleGroup],
        cached: Option<DefaultCompiler>,
    ) -> DefaultCompiler {
        self.enter(ImportPhase::ComputingDefault, None);
        let default = cached.unwrap_or_else(|| {
            let declared = workspace
                .iter()
                .map(|group| compiler_id(group.project.as_ref(), &self.settings));
            DefaultCompiler::new(select_default(declared, &self.registry))
        });
        debug!(compiler_id = default.id(), "workspace default compiler");
        self.enter(ImportPhase::Idle, None);
        default
    }

    /// Phase 2: applies `default` and configures every module.
    pub fn apply(
        &mut self,
        workspace: &[ModuleGroup],
        default: &DefaultCompiler,
        sink: &mut dyn CompilerConfigurationSink,
    ) -> PassReport {
        let mut report = PassReport::default();

        self.enter(ImportPhase::ApplyingDefault, Some(&mut report));
        match apply_default(default.extension().as_ref(), &self.settings, sink) {
            Ok(changed) => report.default_changed = changed,
            Err(diagnostic) => {
                warn!(error = %diagnostic, "default compiler left unchanged");
                report.diagnostics.push(diagnostic);
            }
        }

        self.enter(ImportPhase::ConfiguringModules, Some(&mut report));
        for group in workspace {
            self.configure_group(group, default, sink, &mut report);
        }

        self.enter(ImportPhase::ReconcilingStale, Some(&mut report));
        reconcile(workspace, sink, &mut report);

        self.enter(ImportPhase::Idle, Some(&mut report));
        info!(
            modules = report.modules.len(),
            removed = report.removed_modules.len(),
            diagnostics = report.diagnostics.len(),
            "compiler import finished"
        );
        report
    }

    /// Both phases in one call. Returns the default so the caller can cache it.
    pub fn run(
        &mut self,
        workspace: &[ModuleGroup],
        cached: Option<DefaultCompiler>,
        sink: &mut dyn CompilerConfigurationSink,
    ) -> (DefaultCompiler, PassReport) {
        let default = self.compute_default(workspace, cached);
        let report = self.apply(workspace, &default, sink);
        (default, report)
    }

    fn configure_group(
        &self,
        group: &ModuleGroup,
        default: &DefaultCompiler,
        sink: &mut dyn CompilerConfigurationSink,
        report: &mut PassReport,
    ) {
        let project = group.project.as_ref();
        let config = extract(project, &self.settings);
        let options = arguments::collect(&config);
        let extension = config
            .declared_compiler_id
            .and_then(|id| self.registry.get(id))
            .unwrap_or_else(|| Arc::clone(default.extension()));

        for module in &group.modules {
            self.configure_module(module, project, extension.as_ref(), &options, sink);

            let target = target_level::resolve(module, project, default.extension().as_ref());
            sink.set_bytecode_target(&module.name, &target.level);

            if let Some(requested) = target.adjusted_from {
                let notification = ImportNotification::LanguageLevelAdjusted {
                    requested: requested.version_string(),
                    applied: target.level.clone(),
                };
                if report.notifications.is_empty() {
                    warn!(module = %module.name, "{notification}");
                    sink.notify(notification.clone());
                    report.notifications.push(notification);
                }
            }

            report.modules.push(ModuleOutcome {
                module: module.name.clone(),
                project: project.id().to_string(),
                compiler_id: extension.id().to_string(),
                backend: extension.backend_compiler_name().to_string(),
                options: options.clone(),
                target: target.level,
                target_source: target.source,
            });
        }

        exclude_archetype_resources(project, sink, report);
    }

    fn configure_module(
        &self,
        module: &ModuleRef,
        project: &dyn ProjectDescriptor,
        extension: &dyn CompilerExtension,
        options: &[String],
        sink: &mut dyn CompilerConfigurationSink,
    ) {
        debug!(
            module = %module.name,
            project = project.id(),
            compiler_id = extension.id(),
            options = ?options,
            "configuring module compiler options"
        );
        if options.is_empty() {
            extension.clear_options(sink, module);
        } else {
            extension.configure_options(sink, module, options.to_vec());
        }

        for other in self
            .registry
            .iter()
            .filter(|other| other.id() != extension.id())
        {
            other.clear_options(sink, module);
        }
    }
}

fn exclude_archetype_resources(
    project: &dyn ProjectDescriptor,
    sink: &mut dyn CompilerConfigurationSink,
    report: &mut PassReport,
) {
    let path: PathBuf = ARCHETYPE_RESOURCES
        .iter()
        .fold(project.directory().to_path_buf(), |path, segment| path.join(segment));

    let is_dir = match std::fs::metadata(&path) {
        Ok(metadata) => metadata.is_dir(),
        Err(error) if error.kind() == ErrorKind::NotFound => false,
        Err(source) => {
            debug!(path = %path.display(), error = %source, "skipping archetype resource exclusion");
            report
                .diagnostics
                .push(ImportDiagnostic::ResourcePathUnavailable { path, source });
            return;
        }
    };

    sink.dispose_exclusions(project.id());
    if is_dir {
        debug!(path = %path.display(), "excluding archetype resources");
        sink.add_exclusion(ExcludeEntry {
            path,
            include_subdirectories: true,
            owner: project.id().to_string(),
        });
    }
}

fn reconcile(
    workspace: &[ModuleGroup],
    sink: &mut dyn CompilerConfigurationSink,
    report: &mut PassReport,
) {
    let modules: IndexSet<&str> = workspace
        .iter()
        .flat_map(|group| group.modules.iter().map(|module| module.name.as_str()))
        .collect();
    let projects: IndexSet<&str> = workspace.iter().map(|group| group.project.id()).collect();

    for module in sink.configured_modules() {
        if !modules.contains(module.as_str()) {
            debug!(module = %module, "removing settings of module no longer in the workspace");
            sink.remove_module(&module);
            report.removed_modules.push(module);
        }
    }

    for owner in sink.exclusion_owners() {
        if !projects.contains(owner.as_str()) {
            sink.dispose_exclusions(&owner);
        }
    }
}
