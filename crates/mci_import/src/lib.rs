// mci_import - Maven compiler settings import engine
pub mod arguments;
pub mod error;
pub mod extension;
pub mod extract;
pub mod model;
pub mod orchestrator;
pub mod placeholder;
pub mod selector;
pub mod settings;
pub mod sink;
pub mod target_level;

pub use error::ImportDiagnostic;
pub use extension::{
    CANONICAL_COMPILER_ID, CompilerExtension, EclipseExtension, ExtensionRegistry, JavacExtension,
};
pub use extract::{LanguageLevelSettings, NormalizedModuleConfig};
pub use model::{
    AGGREGATOR_PACKAGING, COMPILER_PLUGIN, ModuleGroup, ModuleKind, ModuleRef, PluginCoordinates,
    PluginDescriptor, ProjectDescriptor, RawConfig, StaticProject,
};
pub use orchestrator::{CompilerImporter, DefaultCompiler, ImportPhase, ModuleOutcome, PassReport};
pub use placeholder::{has_unresolved_placeholder, resolved_text};
pub use settings::ImportSettings;
pub use sink::{
    CompilerConfigurationSink, ExcludeEntry, ImportNotification, InMemoryCompilerConfiguration,
};
pub use target_level::{JavaLanguageLevel, TargetLevel, TargetLevelSource};
