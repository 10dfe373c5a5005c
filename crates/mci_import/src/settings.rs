use serde::{Deserialize, Serialize};

/// Feature toggles supplied by the host for one import pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Import compiler arguments from the compiler plugin configuration.
    pub argument_auto_import: bool,
    /// Detect the workspace default compiler from declared compiler ids.
    pub auto_detect_compiler: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            argument_auto_import: true,
            auto_detect_compiler: true,
        }
    }
}

impl ImportSettings {
    /// True when the per-module plugin configuration may be consulted.
    pub fn reads_plugin_configuration(&self) -> bool {
        self.argument_auto_import && self.auto_detect_compiler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_both_toggles() {
        let settings = ImportSettings::default();
        assert!(settings.argument_auto_import);
        assert!(settings.auto_detect_compiler);
        assert!(settings.reads_plugin_configuration());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: ImportSettings =
            serde_json::from_str(r#"{ "auto_detect_compiler": false }"#).expect("parse");
        assert!(settings.argument_auto_import);
        assert!(!settings.auto_detect_compiler);
        assert!(!settings.reads_plugin_configuration());
    }
}
