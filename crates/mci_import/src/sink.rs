//! Seam towards the host's compiler-configuration storage.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Path excluded from compilation, disposed together with its owner project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExcludeEntry {
    pub path: PathBuf,
    pub include_subdirectories: bool,
    pub owner: String,
}

/// User-visible message raised during an import pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportNotification {
    /// A language level below the supported minimum was raised.
    LanguageLevelAdjusted { requested: String, applied: String },
}

impl fmt::Display for ImportNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportNotification::LanguageLevelAdjusted { requested, applied } => write!(
                f,
                "language level {requested} is not supported, using {applied} instead"
            ),
        }
    }
}

/// Compiler settings store mutated by the import pass.
///
/// Option and target writes replace previous values; they never append.
pub trait CompilerConfigurationSink {
    fn default_compiler(&self) -> Option<&str>;

    fn set_default_compiler(&mut self, compiler: &str);

    fn is_compiler_registered(&self, compiler: &str) -> bool;

    /// Replaces the additional options of `module` for the backend compiler.
    fn set_additional_options(&mut self, compiler: &str, module: &str, options: Vec<String>);

    fn clear_additional_options(&mut self, compiler: &str, module: &str);

    fn set_bytecode_target(&mut self, module: &str, level: &str);

    /// Adds an exclusion entry; an equal entry already present is kept once.
    fn add_exclusion(&mut self, entry: ExcludeEntry);

    /// Drops every exclusion entry registered by `owner`.
    fn dispose_exclusions(&mut self, owner: &str);

    fn exclusion_owners(&self) -> Vec<String>;

    /// Modules that currently hold any compiler setting.
    fn configured_modules(&self) -> Vec<String>;

    fn remove_module(&mut self, module: &str);

    fn notify(&mut self, notification: ImportNotification);
}

/// Plain in-memory [`CompilerConfigurationSink`], serialisable so callers can
/// persist it between passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryCompilerConfiguration {
    pub default_compiler: Option<String>,
    pub registered_compilers: IndexSet<String>,
    /// backend compiler -> module -> options
    pub additional_options: IndexMap<String, IndexMap<String, Vec<String>>>,
    pub bytecode_targets: IndexMap<String, String>,
    pub exclusions: IndexSet<ExcludeEntry>,
    #[serde(skip)]
    pub notifications: Vec<ImportNotification>,
}

impl InMemoryCompilerConfiguration {
    pub fn new<I, S>(registered_compilers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registered_compilers: registered_compilers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_default_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.default_compiler = Some(compiler.into());
        self
    }

    pub fn options(&self, compiler: &str, module: &str) -> Option<&[String]> {
        self.additional_options
            .get(compiler)
            .and_then(|modules| modules.get(module))
            .map(Vec::as_slice)
    }

    pub fn bytecode_target(&self, module: &str) -> Option<&str> {
        self.bytecode_targets.get(module).map(String::as_str)
    }
}

impl CompilerConfigurationSink for InMemoryCompilerConfiguration {
    fn default_compiler(&self) -> Option<&str> {
        self.default_compiler.as_deref()
    }

    fn set_default_compiler(&mut self, compiler: &str) {
        self.default_compiler = Some(compiler.to_string());
    }

    fn is_compiler_registered(&self, compiler: &str) -> bool {
        self.registered_compilers.contains(compiler)
    }

    fn set_additional_options(&mut self, compiler: &str, module: &str, options: Vec<String>) {
        if options.is_empty() {
            self.clear_additional_options(compiler, module);
            return;
        }
        self.additional_options
            .entry(compiler.to_string())
            .or_default()
            .insert(module.to_string(), options);
    }

    fn clear_additional_options(&mut self, compiler: &str, module: &str) {
        if let Some(modules) = self.additional_options.get_mut(compiler) {
            modules.shift_remove(module);
            if modules.is_empty() {
                self.additional_options.shift_remove(compiler);
            }
        }
    }

    fn set_bytecode_target(&mut self, module: &str, level: &str) {
        self.bytecode_targets
            .insert(module.to_string(), level.to_string());
    }

    fn add_exclusion(&mut self, entry: ExcludeEntry) {
        self.exclusions.insert(entry);
    }

    fn dispose_exclusions(&mut self, owner: &str) {
        self.exclusions.retain(|entry| entry.owner != owner);
    }

    fn exclusion_owners(&self) -> Vec<String> {
        self.exclusions
            .iter()
            .map(|entry| entry.owner.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    fn configured_modules(&self) -> Vec<String> {
        let mut modules: IndexSet<String> = self.bytecode_targets.keys().cloned().collect();
        for per_module in self.additional_options.values() {
            modules.extend(per_module.keys().cloned());
        }
        modules.into_iter().collect()
    }

    fn remove_module(&mut self, module: &str) {
        self.bytecode_targets.shift_remove(module);
        let compilers: Vec<String> = self.additional_options.keys().cloned().collect();
        for compiler in compilers {
            self.clear_additional_options(&compiler, module);
        }
    }

    fn notify(&mut self, notification: ImportNotification) {
        if !self.notifications.contains(&notification) {
            self.notifications.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_are_replaced_not_appended() {
        let mut sink = InMemoryCompilerConfiguration::new(["Javac"]);
        sink.set_additional_options("Javac", "core", vec!["-g".into()]);
        sink.set_additional_options("Javac", "core", vec!["-parameters".into()]);
        assert_eq!(
            sink.options("Javac", "core"),
            Some(&["-parameters".to_string()][..])
        );
    }

    #[test]
    fn empty_options_clear_the_entry() {
        let mut sink = InMemoryCompilerConfiguration::new(["Javac"]);
        sink.set_additional_options("Javac", "core", vec!["-g".into()]);
        sink.set_additional_options("Javac", "core", Vec::new());
        assert_eq!(sink.options("Javac", "core"), None);
        assert!(sink.additional_options.is_empty());
    }

    #[test]
    fn exclusions_are_deduplicated_and_disposed_per_owner() {
        let mut sink = InMemoryCompilerConfiguration::default();
        let entry = ExcludeEntry {
            path: PathBuf::from("/ws/archetype/src/main/resources/archetype-resources"),
            include_subdirectories: true,
            owner: "org.example:archetype".into(),
        };
        sink.add_exclusion(entry.clone());
        sink.add_exclusion(entry);
        assert_eq!(sink.exclusions.len(), 1);
        assert_eq!(sink.exclusion_owners(), vec!["org.example:archetype"]);

        sink.dispose_exclusions("org.example:archetype");
        assert!(sink.exclusions.is_empty());
    }

    #[test]
    fn remove_module_drops_every_setting() {
        let mut sink = InMemoryCompilerConfiguration::new(["Javac", "Eclipse"]);
        sink.set_additional_options("Javac", "old", vec!["-g".into()]);
        sink.set_additional_options("Eclipse", "old", vec!["-warn:none".into()]);
        sink.set_bytecode_target("old", "17");
        sink.set_bytecode_target("kept", "21");

        assert_eq!(sink.configured_modules(), vec!["old", "kept"]);
        sink.remove_module("old");
        assert_eq!(sink.configured_modules(), vec!["kept"]);
        assert!(sink.additional_options.is_empty());
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut sink = InMemoryCompilerConfiguration::new(["Javac"]).with_default_compiler("Javac");
        sink.set_bytecode_target("core", "17");
        sink.notify(ImportNotification::LanguageLevelAdjusted {
            requested: "1.5".into(),
            applied: "1.8".into(),
        });

        let json = serde_json::to_string(&sink).expect("serialize");
        let restored: InMemoryCompilerConfiguration =
            serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.bytecode_target("core"), Some("17"));
        assert_eq!(restored.default_compiler(), Some("Javac"));
        assert!(restored.notifications.is_empty());
    }
}
