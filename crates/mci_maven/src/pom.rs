use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use mci_import::{
    AGGREGATOR_PACKAGING, PluginCoordinates, PluginDescriptor, ProjectDescriptor, RawConfig,
};
use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::debug;

const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";
const DEFAULT_PACKAGING: &str = "jar";

#[derive(Debug, Error)]
pub enum PomError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse pom.xml")]
    Xml(#[from] roxmltree::Error),
    #[error("pom.xml has no <project> element")]
    MissingProject,
    #[error("pom.xml does not declare {0}")]
    MissingCoordinate(&'static str),
}

/// Project model read from a single `pom.xml`.
///
/// Property references are kept verbatim; nothing here interpolates
/// `${...}` values.
#[derive(Debug, Clone)]
pub struct MavenProject {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub packaging: String,
    pub properties: IndexMap<String, String>,
    pub plugins: Vec<PluginDescriptor>,
    pub directory: PathBuf,
    id: String,
}

impl MavenProject {
    pub fn load(path: &Path) -> Result<Self, PomError> {
        let contents = fs::read_to_string(path).map_err(|source| PomError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&contents, directory)
    }

    pub fn parse(contents: &str, directory: impl Into<PathBuf>) -> Result<Self, PomError> {
        let document = Document::parse(contents)?;
        let project = document.root_element();
        if !project.has_tag_name("project") {
            return Err(PomError::MissingProject);
        }

        let parent = child(&project, "parent");
        let artifact_id =
            node_text(&project, "artifactId").ok_or(PomError::MissingCoordinate("artifactId"))?;
        let group_id = node_text(&project, "groupId")
            .or_else(|| parent.and_then(|parent| node_text(&parent, "groupId")))
            .ok_or(PomError::MissingCoordinate("groupId"))?;
        let version = node_text(&project, "version")
            .or_else(|| parent.and_then(|parent| node_text(&parent, "version")));
        let packaging =
            node_text(&project, "packaging").unwrap_or_else(|| DEFAULT_PACKAGING.to_string());

        let build = child(&project, "build");
        let managed = build
            .and_then(|build| child(&build, "pluginManagement"))
            .map(|management| parse_plugins(&management))
            .unwrap_or_default();
        let plugins = build
            .map(|build| parse_plugins(&build))
            .unwrap_or_default()
            .into_iter()
            .map(|plugin| inherit_management(plugin, &managed))
            .collect::<Vec<_>>();

        debug!(
            project = %format!("{group_id}:{artifact_id}"),
            plugins = plugins.len(),
            "parsed pom.xml"
        );

        Ok(Self {
            id: format!("{group_id}:{artifact_id}"),
            group_id,
            artifact_id,
            version,
            packaging,
            properties: parse_properties(&project),
            plugins,
            directory: directory.into(),
        })
    }

    pub fn is_pom_packaging(&self) -> bool {
        self.packaging == AGGREGATOR_PACKAGING
    }
}

impl ProjectDescriptor for MavenProject {
    fn id(&self) -> &str {
        &self.id
    }

    fn packaging(&self) -> &str {
        &self.packaging
    }

    fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    fn plugin(&self, coordinates: &PluginCoordinates) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|plugin| plugin.matches(coordinates))
    }

    fn directory(&self) -> &Path {
        &self.directory
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn node_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn parse_properties(project: &Node<'_, '_>) -> IndexMap<String, String> {
    child(project, "properties")
        .map(|properties| {
            properties
                .children()
                .filter(|node| node.is_element())
                .map(|node| {
                    let value = node.text().map(str::trim).unwrap_or_default();
                    (node.tag_name().name().to_string(), value.to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_plugins(container: &Node<'_, '_>) -> Vec<PluginDescriptor> {
    let Some(plugins) = child(container, "plugins") else {
        return Vec::new();
    };
    plugins
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "plugin")
        .filter_map(|plugin| {
            let artifact_id = node_text(&plugin, "artifactId")?;
            Some(PluginDescriptor {
                group_id: node_text(&plugin, "groupId")
                    .unwrap_or_else(|| DEFAULT_PLUGIN_GROUP.to_string()),
                artifact_id,
                version: node_text(&plugin, "version"),
                configuration: child(&plugin, "configuration").map(RawConfig::from_node),
            })
        })
        .collect()
}

// Declared plugins take version and configuration from <pluginManagement>
// when they leave them out; declared configuration elements win by name.
fn inherit_management(mut plugin: PluginDescriptor, managed: &[PluginDescriptor]) -> PluginDescriptor {
    let Some(management) = managed.iter().find(|entry| {
        entry.group_id == plugin.group_id && entry.artifact_id == plugin.artifact_id
    }) else {
        return plugin;
    };

    if plugin.version.is_none() {
        plugin.version = management.version.clone();
    }

    plugin.configuration = match (plugin.configuration.take(), &management.configuration) {
        (Some(own), Some(inherited)) => Some(merge_configuration(own, inherited)),
        (own, inherited) => own.or_else(|| inherited.clone()),
    };
    plugin
}

fn merge_configuration(mut own: RawConfig, inherited: &RawConfig) -> RawConfig {
    for entry in &inherited.children {
        if own.child(&entry.name).is_none() {
            own.children.push(entry.clone());
        }
    }
    own
}
