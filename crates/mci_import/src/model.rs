//! Workspace input model: configuration trees, modules and the project
//! descriptor seam implemented by build-description readers.

use indexmap::IndexMap;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Packaging value used by aggregator (parent / reactor) projects.
pub const AGGREGATOR_PACKAGING: &str = "pom";

/// Maven coordinates of a build plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginCoordinates {
    pub group_id: &'static str,
    pub artifact_id: &'static str,
}

/// `org.apache.maven.plugins:maven-compiler-plugin`.
pub const COMPILER_PLUGIN: PluginCoordinates = PluginCoordinates {
    group_id: "org.apache.maven.plugins",
    artifact_id: "maven-compiler-plugin",
};

impl fmt::Display for PluginCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// Generic element tree mirroring a plugin `<configuration>` block.
///
/// Text is stored trimmed; elements without any text content carry `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub name: String,
    pub text: Option<String>,
    pub children: Vec<RawConfig>,
}

impl RawConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Leaf element with the given text.
    pub fn leaf(name: impl Into<String>, text: impl AsRef<str>) -> Self {
        Self::new(name).with_text(text)
    }

    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        let trimmed = text.as_ref().trim();
        self.text = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_child(mut self, child: RawConfig) -> Self {
        self.children.push(child);
        self
    }

    /// First direct child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&RawConfig> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Every direct child with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RawConfig> {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(RawConfig::text)
    }

    /// Copies an XML element (and its element descendants) into a tree.
    pub fn from_node(node: Node<'_, '_>) -> Self {
        let text: String = node
            .children()
            .filter(|child| child.is_text())
            .filter_map(|child| child.text())
            .collect();

        let mut config = Self::new(node.tag_name().name()).with_text(text);
        config.children = node
            .children()
            .filter(|child| child.is_element())
            .map(RawConfig::from_node)
            .collect();
        config
    }

    /// Parses an XML fragment whose root element becomes the tree root.
    pub fn parse_xml(xml: &str) -> Result<Self, roxmltree::Error> {
        let document = Document::parse(xml)?;
        Ok(Self::from_node(document.root_element()))
    }
}

/// Whether an IDE module compiles production or test sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    #[default]
    Main,
    Test,
}

/// IDE module produced by a build-description project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRef {
    pub name: String,
    #[serde(default)]
    pub kind: ModuleKind,
}

impl ModuleRef {
    pub fn main(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ModuleKind::Main,
        }
    }

    pub fn test(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ModuleKind::Test,
        }
    }

    pub fn is_test(&self) -> bool {
        self.kind == ModuleKind::Test
    }
}

/// A declared build plugin together with its configuration tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub configuration: Option<RawConfig>,
}

impl PluginDescriptor {
    pub fn new(coordinates: PluginCoordinates) -> Self {
        Self {
            group_id: coordinates.group_id.to_string(),
            artifact_id: coordinates.artifact_id.to_string(),
            version: None,
            configuration: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_configuration(mut self, configuration: RawConfig) -> Self {
        self.configuration = Some(configuration);
        self
    }

    pub fn matches(&self, coordinates: &PluginCoordinates) -> bool {
        self.group_id == coordinates.group_id && self.artifact_id == coordinates.artifact_id
    }
}

/// Read-only view of one build-description project.
pub trait ProjectDescriptor {
    /// Stable identifier (typically `groupId:artifactId`).
    fn id(&self) -> &str;

    fn packaging(&self) -> &str;

    fn properties(&self) -> &IndexMap<String, String>;

    /// Declared plugin matching the coordinates, or `None` when the plugin is
    /// absent or not applicable to this project.
    fn plugin(&self, coordinates: &PluginCoordinates) -> Option<&PluginDescriptor>;

    /// Base directory of the project.
    fn directory(&self) -> &Path;

    fn is_aggregator(&self) -> bool {
        self.packaging() == AGGREGATOR_PACKAGING
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.properties().get(key).map(String::as_str)
    }
}

/// One project paired with the IDE modules it produced.
pub struct ModuleGroup {
    pub project: Box<dyn ProjectDescriptor>,
    pub modules: Vec<ModuleRef>,
}

impl ModuleGroup {
    pub fn new(project: impl ProjectDescriptor + 'static, modules: Vec<ModuleRef>) -> Self {
        Self {
            project: Box::new(project),
            modules,
        }
    }
}

impl fmt::Debug for ModuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleGroup")
            .field("project", &self.project.id())
            .field("modules", &self.modules)
            .finish()
    }
}

/// In-memory project description for hosts that already hold the model.
#[derive(Debug, Clone, Default)]
pub struct StaticProject {
    pub id: String,
    pub packaging: String,
    pub properties: IndexMap<String, String>,
    pub plugins: Vec<PluginDescriptor>,
    pub directory: PathBuf,
}

impl StaticProject {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            packaging: "jar".to_string(),
            ..Self::default()
        }
    }

    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_plugin(mut self, plugin: PluginDescriptor) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Declares `maven-compiler-plugin` with the given configuration.
    pub fn with_compiler_configuration(self, configuration: RawConfig) -> Self {
        self.with_plugin(PluginDescriptor::new(COMPILER_PLUGIN).with_configuration(configuration))
    }
}

impl ProjectDescriptor for StaticProject {
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
