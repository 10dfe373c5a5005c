//! Compiler extensions map a Maven `compilerId` onto a backend compiler of the
//! host and know how to push options into it.

use crate::model::{ModuleRef, ProjectDescriptor};
use crate::sink::CompilerConfigurationSink;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Maven `compilerId` of the built-in reference compiler.
pub const CANONICAL_COMPILER_ID: &str = "javac";

/// Pluggable mapping between a Maven compiler id and a backend compiler.
pub trait CompilerExtension: Send + Sync {
    /// Maven `compilerId` handled by this extension.
    fn id(&self) -> &str;

    /// Name of the backend compiler in the host configuration.
    fn backend_compiler_name(&self) -> &str;

    /// Backend compiler, when the host has it registered.
    fn backend_compiler(&self, sink: &dyn CompilerConfigurationSink) -> Option<&str> {
        let name = self.backend_compiler_name();
        sink.is_compiler_registered(name).then_some(name)
    }

    /// Replaces the backend options of `module` with `options`.
    fn configure_options(
        &self,
        sink: &mut dyn CompilerConfigurationSink,
        module: &ModuleRef,
        options: Vec<String>,
    ) {
        sink.set_additional_options(self.backend_compiler_name(), &module.name, options);
    }

    fn clear_options(&self, sink: &mut dyn CompilerConfigurationSink, module: &ModuleRef) {
        sink.clear_additional_options(self.backend_compiler_name(), &module.name);
    }

    /// Explicit bytecode target for the module, or `None` to use the
    /// language-level rules.
    fn default_target_level(
        &self,
        _module: &ModuleRef,
        _project: &dyn ProjectDescriptor,
    ) -> Option<String> {
        None
    }
}

impl fmt::Debug for dyn CompilerExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerExtension")
            .field("id", &self.id())
            .field("backend", &self.backend_compiler_name())
            .finish()
    }
}

/// `javac`, the canonical compiler.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavacExtension;

impl CompilerExtension for JavacExtension {
    fn id(&self) -> &str {
        CANONICAL_COMPILER_ID
    }

    fn backend_compiler_name(&self) -> &str {
        "Javac"
    }
}

/// Eclipse compiler (`plexus-compiler-eclipse`).
#[derive(Debug, Default, Clone, Copy)]
pub struct EclipseExtension;

impl CompilerExtension for EclipseExtension {
    fn id(&self) -> &str {
        "eclipse"
    }

    fn backend_compiler_name(&self) -> &str {
        "Eclipse"
    }
}

/// Ordered set of compiler extensions, looked up by Maven compiler id.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    extensions: IndexMap<String, Arc<dyn CompilerExtension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `javac` and `eclipse` extensions.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JavacExtension));
        registry.register(Arc::new(EclipseExtension));
        registry
    }

    /// Adds an extension; a later registration with the same id replaces the
    /// earlier one in place.
    pub fn register(&mut self, extension: Arc<dyn CompilerExtension>) {
        let id = extension.id().to_string();
        tracing::debug!(extension = %id, "registered compiler extension");
        self.extensions.insert(id, extension);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn CompilerExtension>> {
        self.extensions.get(id).cloned()
    }

    /// The canonical extension; falls back to the built-in `javac` when the
    /// registry does not hold one.
    pub fn canonical(&self) -> Arc<dyn CompilerExtension> {
        self.get(CANONICAL_COMPILER_ID)
            .unwrap_or_else(|| Arc::new(JavacExtension))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CompilerExtension>> {
        self.extensions.values()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.extensions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.extensions.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::InMemoryCompilerConfiguration;

    #[test]
    fn builtin_registry_keeps_registration_order() {
        let registry = ExtensionRegistry::builtin();
        assert_eq!(registry.ids(), vec!["javac", "eclipse"]);
        assert_eq!(registry.canonical().id(), CANONICAL_COMPILER_ID);
    }

    #[test]
    fn canonical_falls_back_when_unregistered() {
        let registry = ExtensionRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.canonical().backend_compiler_name(), "Javac");
    }

    #[test]
    fn backend_compiler_requires_registration() {
        let sink = InMemoryCompilerConfiguration::new(["Javac"]);
        assert_eq!(JavacExtension.backend_compiler(&sink), Some("Javac"));
        assert_eq!(EclipseExtension.backend_compiler(&sink), None);
    }

    #[test]
    fn configure_options_writes_to_backend_slot() {
        let mut sink = InMemoryCompilerConfiguration::new(["Javac", "Eclipse"]);
        let module = ModuleRef::main("core");
        EclipseExtension.configure_options(&mut sink, &module, vec!["-warn:none".into()]);
        assert_eq!(
            sink.options("Eclipse", "core"),
            Some(&["-warn:none".to_string()][..])
        );
        EclipseExtension.clear_options(&mut sink, &module);
        assert_eq!(sink.options("Eclipse", "core"), None);
    }
}
