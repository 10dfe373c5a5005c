//! Normalises a project's compiler plugin configuration and properties into
//! the values the selector, the argument collector and the target-level
//! resolver consume.

use crate::extension::CANONICAL_COMPILER_ID;
use crate::model::{COMPILER_PLUGIN, ProjectDescriptor, RawConfig};
use crate::placeholder::{has_unresolved_placeholder, resolved_opt};
use crate::settings::ImportSettings;

/// Property equivalent of the plugin's `<parameters>` flag.
pub const PARAMETERS_PROPERTY: &str = "maven.compiler.parameters";

const MAIN_LEVEL_NODES: [&str; 2] = ["release", "source"];
const MAIN_LEVEL_PROPERTIES: [&str; 2] = ["maven.compiler.release", "maven.compiler.source"];
const TEST_LEVEL_NODES: [&str; 2] = ["testRelease", "testSource"];
const TEST_LEVEL_PROPERTIES: [&str; 2] = [
    "maven.compiler.testRelease",
    "maven.compiler.testSource",
];

/// Per-module view of the compiler plugin settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizedModuleConfig<'a> {
    /// Normalised `compilerId`; `None` for aggregator projects.
    pub declared_compiler_id: Option<&'a str>,
    pub parameters_property: Option<&'a str>,
    pub plugin_config: Option<&'a RawConfig>,
}

/// Compiler plugin `<configuration>`, when the toggles allow reading it and
/// the plugin is declared for the project.
pub fn compiler_configuration<'a>(
    project: &'a dyn ProjectDescriptor,
    settings: &ImportSettings,
) -> Option<&'a RawConfig> {
    if !settings.reads_plugin_configuration() {
        return None;
    }
    project.plugin(&COMPILER_PLUGIN)?.configuration.as_ref()
}

/// Maps a raw `compilerId` onto the id used for selection.
///
/// Missing, blank, canonical and unresolved values all become the canonical
/// id.
pub fn normalize_compiler_id(raw: Option<&str>) -> &str {
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() && !has_unresolved_placeholder(id) => id,
        _ => CANONICAL_COMPILER_ID,
    }
}

/// Normalised compiler id of a project, aggregators included.
pub fn compiler_id<'a>(project: &'a dyn ProjectDescriptor, settings: &ImportSettings) -> &'a str {
    normalize_compiler_id(
        compiler_configuration(project, settings).and_then(|config| config.child_text("compilerId")),
    )
}

pub fn extract<'a>(
    project: &'a dyn ProjectDescriptor,
    settings: &ImportSettings,
) -> NormalizedModuleConfig<'a> {
    let declared_compiler_id =
        (!project.is_aggregator()).then(|| compiler_id(project, settings));

    NormalizedModuleConfig {
        declared_compiler_id,
        parameters_property: project.property(PARAMETERS_PROPERTY),
        plugin_config: compiler_configuration(project, settings),
    }
}

/// Source language levels configured for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageLevelSettings {
    pub main: Option<String>,
    pub test: Option<String>,
    /// Version of the declared compiler plugin, when resolvable.
    pub compiler_plugin_version: Option<String>,
}

/// Reads the language levels independently of the import toggles.
pub fn language_levels(project: &dyn ProjectDescriptor) -> LanguageLevelSettings {
    let plugin = project.plugin(&COMPILER_PLUGIN);
    let config = plugin.and_then(|plugin| plugin.configuration.as_ref());

    let lookup = |nodes: &[&str], properties: &[&str]| {
        nodes
            .iter()
            .find_map(|node| resolved_opt(config.and_then(|config| config.child_text(node))))
            .or_else(|| {
                properties
                    .iter()
                    .find_map(|key| resolved_opt(project.property(key)))
            })
    };

    LanguageLevelSettings {
        main: lookup(&MAIN_LEVEL_NODES[..], &MAIN_LEVEL_PROPERTIES[..]),
        test: lookup(&TEST_LEVEL_NODES[..], &TEST_LEVEL_PROPERTIES[..]),
        compiler_plugin_version: resolved_opt(plugin.and_then(|plugin| plugin.version.as_deref())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PluginDescriptor, StaticProject};

    fn project_with(config: &str) -> StaticProject {
        StaticProject::new("org.example:core")
            .with_compiler_configuration(RawConfig::parse_xml(config).expect("parse configuration"))
    }

    #[test]
    fn compiler_id_normalisation() {
        assert_eq!(normalize_compiler_id(None), "javac");
        assert_eq!(normalize_compiler_id(Some("   ")), "javac");
        assert_eq!(normalize_compiler_id(Some("javac")), "javac");
        assert_eq!(normalize_compiler_id(Some("${compiler.id}")), "javac");
        assert_eq!(normalize_compiler_id(Some(" eclipse ")), "eclipse");
    }

    #[test]
    fn extract_reads_declared_id_and_parameters_property() {
        let project = project_with(
            "<configuration><compilerId>eclipse</compilerId></configuration>",
        )
        .with_property(PARAMETERS_PROPERTY, "true");
        let settings = ImportSettings::default();

        let config = extract(&project, &settings);
        assert_eq!(config.declared_compiler_id, Some("eclipse"));
        assert_eq!(config.parameters_property, Some("true"));
        assert!(config.plugin_config.is_some());
    }

    #[test]
    fn aggregators_never_declare_an_override() {
        let project = project_with(
            "<configuration><compilerId>eclipse</compilerId></configuration>",
        )
        .with_packaging("pom");
        let settings = ImportSettings::default();

        assert_eq!(extract(&project, &settings).declared_compiler_id, None);
        assert_eq!(compiler_id(&project, &settings), "eclipse");
    }

    #[test]
    fn disabled_toggles_hide_the_plugin_configuration() {
        let project = project_with(
            "<configuration><compilerId>eclipse</compilerId></configuration>",
        );
        let settings = ImportSettings {
            argument_auto_import: false,
            ..ImportSettings::default()
        };

        let config = extract(&project, &settings);
        assert!(config.plugin_config.is_none());
        assert_eq!(config.declared_compiler_id, Some("javac"));
    }

    #[test]
    fn missing_plugin_means_no_configuration() {
        let project = StaticProject::new("org.example:core");
        let config = extract(&project, &ImportSettings::default());
        assert!(config.plugin_config.is_none());
        assert_eq!(config.declared_compiler_id, Some("javac"));
    }

    #[test]
    fn language_levels_prefer_plugin_nodes_over_properties() {
        let project = project_with(
            "<configuration><source>11</source><testRelease>${test.level}</testRelease></configuration>",
        )
        .with_property("maven.compiler.release", "17")
        .with_property("maven.compiler.testSource", "21");

        let levels = language_levels(&project);
        assert_eq!(levels.main.as_deref(), Some("11"));
        assert_eq!(levels.test.as_deref(), Some("21"));
    }

    #[test]
    fn language_levels_release_wins_over_source() {
        let project = StaticProject::new("org.example:core")
            .with_property("maven.compiler.source", "1.8")
            .with_property("maven.compiler.release", "17")
            .with_plugin(PluginDescriptor::new(COMPILER_PLUGIN).with_version("3.13.0"));

        let levels = language_levels(&project);
        assert_eq!(levels.main.as_deref(), Some("17"));
        assert_eq!(levels.test, None);
        assert_eq!(levels.compiler_plugin_version.as_deref(), Some("3.13.0"));
    }
}
