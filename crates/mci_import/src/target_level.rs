//! Bytecode target resolution for a single module.

use crate::extension::CompilerExtension;
use crate::extract::language_levels;
use crate::model::{ModuleRef, ProjectDescriptor};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid Java language level: {0}")]
pub struct InvalidLanguageLevel(String);

/// Java language level identified by its feature release number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JavaLanguageLevel(u16);

impl JavaLanguageLevel {
    pub const JDK_1_5: Self = Self(5);
    pub const JDK_1_6: Self = Self(6);
    pub const JDK_1_7: Self = Self(7);
    pub const JDK_1_8: Self = Self(8);

    /// Lowest level the host compiler still accepts.
    pub const MINIMUM_SUPPORTED: Self = Self::JDK_1_8;

    pub fn from_feature(feature: u16) -> Option<Self> {
        (feature > 0).then_some(Self(feature))
    }

    pub const fn feature(self) -> u16 {
        self.0
    }

    /// `1.N` up to Java 8, plain `N` afterwards.
    pub fn version_string(self) -> String {
        if self.0 <= 8 {
            format!("1.{}", self.0)
        } else {
            self.0.to_string()
        }
    }
}

impl FromStr for JavaLanguageLevel {
    type Err = InvalidLanguageLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("1.").unwrap_or(trimmed);
        digits
            .parse::<u16>()
            .ok()
            .and_then(Self::from_feature)
            .ok_or_else(|| InvalidLanguageLevel(trimmed.to_string()))
    }
}

impl fmt::Display for JavaLanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version_string())
    }
}

/// Source level Maven assumes when nothing is configured, by
/// `maven-compiler-plugin` version.
pub fn implied_default_level(plugin_version: Option<&str>) -> Option<JavaLanguageLevel> {
    let version = parse_plugin_version(plugin_version?)?;
    let level = PLUGIN_DEFAULT_LEVELS
        .iter()
        .find(|(since, _)| version >= *since)
        .map(|(_, level)| *level)
        .unwrap_or(JavaLanguageLevel::JDK_1_5);
    Some(level)
}

const PLUGIN_DEFAULT_LEVELS: [(Version, JavaLanguageLevel); 3] = [
    (Version::new(3, 11, 0), JavaLanguageLevel::JDK_1_8),
    (Version::new(3, 9, 0), JavaLanguageLevel::JDK_1_7),
    (Version::new(3, 8, 0), JavaLanguageLevel::JDK_1_6),
];

// Maven versions may omit minor and patch ("3.1", "3-SNAPSHOT"); pad them to
// three numeric segments before handing the text to semver.
fn parse_plugin_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    if let Ok(version) = Version::parse(raw) {
        return Some(version);
    }

    let (core, qualifier) = match raw.split_once('-') {
        Some((core, qualifier)) => (core, Some(qualifier)),
        None => (raw, None),
    };
    let mut numbers = core.split('.').take(3).collect::<Vec<_>>();
    let numeric = |segment: &&str| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
    if !numbers.iter().all(numeric) {
        return None;
    }
    numbers.resize(3, "0");

    let mut padded = numbers.join(".");
    if let Some(qualifier) = qualifier {
        padded.push('-');
        padded.push_str(qualifier);
    }
    Version::parse(&padded).ok()
}

/// Raises levels below [`JavaLanguageLevel::MINIMUM_SUPPORTED`]. The second
/// value tells whether an adjustment happened.
pub fn adjust(level: JavaLanguageLevel) -> (JavaLanguageLevel, bool) {
    if level < JavaLanguageLevel::MINIMUM_SUPPORTED {
        (JavaLanguageLevel::MINIMUM_SUPPORTED, true)
    } else {
        (level, false)
    }
}

/// Where a resolved target level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetLevelSource {
    Extension,
    LanguageLevel,
    ProjectDefault,
    Baseline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLevel {
    pub level: String,
    pub source: TargetLevelSource,
    /// Level that was requested before being raised to the supported minimum.
    pub adjusted_from: Option<JavaLanguageLevel>,
}

/// Computes the bytecode target of `module`.
pub fn resolve(
    module: &ModuleRef,
    project: &dyn ProjectDescriptor,
    default_extension: &dyn CompilerExtension,
) -> TargetLevel {
    if let Some(level) = default_extension.default_target_level(module, project) {
        return TargetLevel {
            level,
            source: TargetLevelSource::Extension,
            adjusted_from: None,
        };
    }

    let levels = language_levels(project);
    let parse = |value: Option<&String>| value.and_then(|value| value.parse::<JavaLanguageLevel>().ok());

    let configured = if module.is_test() {
        parse(levels.test.as_ref()).or_else(|| parse(levels.main.as_ref()))
    } else {
        parse(levels.main.as_ref())
    };

    let (requested, source) = match configured {
        Some(level) => (level, TargetLevelSource::LanguageLevel),
        None => match implied_default_level(levels.compiler_plugin_version.as_deref()) {
            Some(level) => (level, TargetLevelSource::ProjectDefault),
            None => (JavaLanguageLevel::MINIMUM_SUPPORTED, TargetLevelSource::Baseline),
        },
    };

    let (applied, adjusted) = adjust(requested);
    TargetLevel {
        level: applied.version_string(),
        source,
        adjusted_from: adjusted.then_some(requested),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::JavacExtension;
    use crate::model::{COMPILER_PLUGIN, PluginDescriptor, StaticProject};

    struct FixedTarget;

    impl CompilerExtension for FixedTarget {
        fn id(&self) -> &str {
            "fixed"
        }

        fn backend_compiler_name(&self) -> &str {
            "Fixed"
        }

        fn default_target_level(
            &self,
            _module: &ModuleRef,
            _project: &dyn ProjectDescriptor,
        ) -> Option<String> {
            Some("9-custom".to_string())
        }
    }

    #[test]
    fn parses_both_version_notations() {
        assert_eq!("1.8".parse(), Ok(JavaLanguageLevel::JDK_1_8));
        assert_eq!("8".parse(), Ok(JavaLanguageLevel::JDK_1_8));
        assert_eq!(" 17 ".parse::<JavaLanguageLevel>().map(JavaLanguageLevel::feature), Ok(17));
        assert!("seventeen".parse::<JavaLanguageLevel>().is_err());
        assert!("0".parse::<JavaLanguageLevel>().is_err());
    }

    #[test]
    fn version_strings_follow_java_naming() {
        assert_eq!(JavaLanguageLevel::JDK_1_5.version_string(), "1.5");
        assert_eq!(JavaLanguageLevel::JDK_1_8.to_string(), "1.8");
        assert_eq!(
            JavaLanguageLevel::from_feature(21).map(JavaLanguageLevel::version_string),
            Some("21".to_string())
        );
    }

    #[test]
    fn implied_default_follows_plugin_version() {
        assert_eq!(implied_default_level(None), None);
        assert_eq!(implied_default_level(Some("3.13.0")), Some(JavaLanguageLevel::JDK_1_8));
        assert_eq!(implied_default_level(Some("3.11.0")), Some(JavaLanguageLevel::JDK_1_8));
        assert_eq!(implied_default_level(Some("3.10.1")), Some(JavaLanguageLevel::JDK_1_7));
        assert_eq!(implied_default_level(Some("3.8.1")), Some(JavaLanguageLevel::JDK_1_6));
        assert_eq!(implied_default_level(Some("3.1")), Some(JavaLanguageLevel::JDK_1_5));
        assert_eq!(
            implied_default_level(Some("3.12.0-SNAPSHOT")),
            Some(JavaLanguageLevel::JDK_1_8)
        );
    }

    #[test]
    fn snapshot_ranks_below_its_release() {
        assert_eq!(
            implied_default_level(Some("3.11.0-SNAPSHOT")),
            Some(JavaLanguageLevel::JDK_1_7)
        );
        assert_eq!(
            implied_default_level(Some("3.9-SNAPSHOT")),
            Some(JavaLanguageLevel::JDK_1_6)
        );
        assert_eq!(implied_default_level(Some("3.8")), Some(JavaLanguageLevel::JDK_1_6));
    }

    #[test]
    fn unparseable_plugin_version_implies_nothing() {
        assert_eq!(implied_default_level(Some("LATEST")), None);
        assert_eq!(implied_default_level(Some("3..1")), None);
    }

    #[test]
    fn extension_level_is_used_verbatim() {
        let project = StaticProject::new("org.example:core").with_property("maven.compiler.release", "21");
        let target = resolve(&ModuleRef::main("core"), &project, &FixedTarget);
        assert_eq!(target.level, "9-custom");
        assert_eq!(target.source, TargetLevelSource::Extension);
        assert_eq!(target.adjusted_from, None);
    }

    #[test]
    fn test_module_falls_back_to_main_level() {
        let project = StaticProject::new("org.example:core").with_property("maven.compiler.source", "17");
        let target = resolve(&ModuleRef::test("core.test"), &project, &JavacExtension);
        assert_eq!(target.level, "17");
        assert_eq!(target.source, TargetLevelSource::LanguageLevel);
    }

    #[test]
    fn test_module_prefers_test_level() {
        let project = StaticProject::new("org.example:core")
            .with_property("maven.compiler.release", "17")
            .with_property("maven.compiler.testRelease", "21");
        assert_eq!(resolve(&ModuleRef::test("core.test"), &project, &JavacExtension).level, "21");
        assert_eq!(resolve(&ModuleRef::main("core"), &project, &JavacExtension).level, "17");
    }

    #[test]
    fn main_module_ignores_test_level() {
        let project = StaticProject::new("org.example:core")
            .with_property("maven.compiler.testRelease", "21")
            .with_plugin(PluginDescriptor::new(COMPILER_PLUGIN).with_version("3.13.0"));
        let target = resolve(&ModuleRef::main("core"), &project, &JavacExtension);
        assert_eq!(target.level, "1.8");
        assert_eq!(target.source, TargetLevelSource::ProjectDefault);
    }

    #[test]
    fn old_project_default_is_raised_to_minimum() {
        let project = StaticProject::new("org.example:legacy")
            .with_plugin(PluginDescriptor::new(COMPILER_PLUGIN).with_version("3.8.1"));
        let target = resolve(&ModuleRef::main("legacy"), &project, &JavacExtension);
        assert_eq!(target.level, "1.8");
        assert_eq!(target.adjusted_from, Some(JavaLanguageLevel::JDK_1_6));
    }

    #[test]
    fn nothing_configured_resolves_to_baseline() {
        let project = StaticProject::new("org.example:bare");
        let target = resolve(&ModuleRef::test("bare.test"), &project, &JavacExtension);
        assert_eq!(target.level, "1.8");
        assert_eq!(target.source, TargetLevelSource::Baseline);
        assert_eq!(target.adjusted_from, None);
    }

    #[test]
    fn unparsable_level_is_ignored() {
        let project = StaticProject::new("org.example:core").with_property("maven.compiler.source", "latest");
        let target = resolve(&ModuleRef::main("core"), &project, &JavacExtension);
        assert_eq!(target.source, TargetLevelSource::Baseline);
    }
}
