//! Turns a module's compiler plugin configuration into backend compiler
//! options.
//!
//! Emission order is fixed: `-parameters`, the `<compilerArguments>` map, the
//! single `<compilerArgument>`, then `<compilerArgs>` (`<arg>` entries first,
//! `<compilerArg>` entries second). Equal tokens coming from different
//! sources are all kept.

use crate::extract::NormalizedModuleConfig;
use crate::model::RawConfig;
use crate::placeholder::{has_unresolved_placeholder, resolved_opt};
use indexmap::{IndexMap, IndexSet};

const PARAMETERS_FLAG: &str = "-parameters";
const ANNOTATION_PROCESSOR_PREFIX: &str = "-A";
const REPEATED_ARGUMENT_TAGS: [&str; 2] = ["arg", "compilerArg"];

/// Collects the compiler options for one module.
pub fn collect(config: &NormalizedModuleConfig<'_>) -> Vec<String> {
    let mut arguments = Vec::new();

    if parameters_enabled(config) {
        arguments.push(PARAMETERS_FLAG.to_string());
    }

    let Some(plugin) = config.plugin_config else {
        return arguments;
    };

    if let Some(map) = plugin.child("compilerArguments") {
        push_argument_map(map, &mut arguments);
    }

    if let Some(argument) = resolved_opt(plugin.child_text("compilerArgument")) {
        arguments.push(argument);
    }

    if let Some(list) = plugin.child("compilerArgs") {
        for tag in REPEATED_ARGUMENT_TAGS {
            arguments.extend(
                list.children_named(tag)
                    .filter_map(|node| resolved_opt(node.text())),
            );
        }
    }

    arguments
}

// An explicit <parameters> node decides on its own, even when false.
fn parameters_enabled(config: &NormalizedModuleConfig<'_>) -> bool {
    match config.plugin_config.and_then(|plugin| plugin.child("parameters")) {
        Some(node) => parse_boolean(node.text()),
        None => parse_boolean(config.parameters_property),
    }
}

fn parse_boolean(value: Option<&str>) -> bool {
    value.is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

fn push_argument_map(map: &RawConfig, arguments: &mut Vec<String>) {
    let mut values: IndexMap<String, Option<String>> = IndexMap::new();
    let mut unresolved: IndexSet<String> = IndexSet::new();

    for entry in &map.children {
        let key = flag_name(&entry.name);
        if entry.text().is_some_and(has_unresolved_placeholder) {
            unresolved.insert(key.clone());
        }
        values.insert(key, resolved_opt(entry.text()));
    }

    for (key, value) in values {
        if key.starts_with(ANNOTATION_PROCESSOR_PREFIX) {
            if let Some(value) = &value {
                arguments.push(format!("{key}={value}"));
                continue;
            }
        }
        if unresolved.contains(&key) {
            continue;
        }
        arguments.push(key);
        arguments.extend(value);
    }
}

fn flag_name(tag: &str) -> String {
    if tag.starts_with('-') {
        tag.to_string()
    } else {
        format!("-{tag}")
    }
}
