use std::error::Error;
use std::fmt::Write as _;

use mci_import::{
    DefaultCompiler, ExcludeEntry, ImportNotification, InMemoryCompilerConfiguration,
    ModuleOutcome, PassReport, TargetLevelSource,
};
use serde::Serialize;

use crate::manifest::ManifestError;

/// Result of one `mci import` run, shaped for output.
#[derive(Debug, Serialize)]
pub struct ImportSummary<'a> {
    pub default_compiler_id: &'a str,
    pub default_backend: Option<&'a str>,
    pub default_changed: bool,
    pub modules: &'a [ModuleOutcome],
    pub removed_modules: &'a [String],
    pub exclusions: Vec<&'a ExcludeEntry>,
    pub notifications: &'a [ImportNotification],
    pub diagnostics: Vec<String>,
    pub skipped_projects: Vec<String>,
}

impl<'a> ImportSummary<'a> {
    pub fn new(
        default: &'a DefaultCompiler,
        report: &'a PassReport,
        configuration: &'a InMemoryCompilerConfiguration,
        skipped: &[ManifestError],
    ) -> Self {
        Self {
            default_compiler_id: default.id(),
            default_backend: configuration.default_compiler.as_deref(),
            default_changed: report.default_changed,
            modules: &report.modules,
            removed_modules: &report.removed_modules,
            exclusions: configuration.exclusions.iter().collect(),
            notifications: &report.notifications,
            diagnostics: report
                .diagnostics
                .iter()
                .filter(|diagnostic| diagnostic.is_user_visible())
                .map(ToString::to_string)
                .collect(),
            skipped_projects: skipped.iter().map(|error| error_chain(error)).collect(),
        }
    }
}

pub fn render_summary(summary: &ImportSummary<'_>) -> String {
    let mut buffer = String::new();
    let backend = summary.default_backend.unwrap_or("-");
    let changed = if summary.default_changed { " (changed)" } else { "" };
    let _ = writeln!(
        buffer,
        "Default compiler: {backend} [{}]{changed}",
        summary.default_compiler_id
    );
    buffer.push('\n');
    buffer.push_str(&render_module_table(summary.modules));

    if !summary.removed_modules.is_empty() {
        let _ = writeln!(buffer, "\nRemoved modules: {}", summary.removed_modules.join(", "));
    }
    if !summary.exclusions.is_empty() {
        buffer.push_str("\nExcluded paths:\n");
        for entry in &summary.exclusions {
            let _ = writeln!(buffer, "  {} ({})", entry.path.display(), entry.owner);
        }
    }
    for notification in summary.notifications {
        let _ = writeln!(buffer, "\nnote: {notification}");
    }
    for diagnostic in &summary.diagnostics {
        let _ = writeln!(buffer, "\nwarning: {diagnostic}");
    }
    for skipped in &summary.skipped_projects {
        let _ = writeln!(buffer, "\nwarning: {skipped}");
    }
    buffer
}

/// `error` followed by each of its sources, separated by `: `.
pub fn error_chain(error: &dyn Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(text, ": {cause}");
        source = cause.source();
    }
    text
}

fn render_module_table(modules: &[ModuleOutcome]) -> String {
    let headers = ["module", "compiler", "backend", "target", "source", "options"];
    let rows = modules
        .iter()
        .map(|outcome| {
            vec![
                outcome.module.clone(),
                outcome.compiler_id.clone(),
                outcome.backend.clone(),
                outcome.target.clone(),
                format_source(outcome.target_source).to_string(),
                if outcome.options.is_empty() {
                    "-".to_string()
                } else {
                    outcome.options.join(" ")
                },
            ]
        })
        .collect::<Vec<_>>();

    // Formatter padding counts chars, so widths do too.
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut buffer = String::new();
    append_row(&mut buffer, &headers, &widths);
    append_separator(&mut buffer, &widths);
    for row in &rows {
        let cells = row.iter().map(String::as_str).collect::<Vec<_>>();
        append_row(&mut buffer, &cells, &widths);
    }
    buffer
}

fn append_row(buffer: &mut String, cells: &[&str], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            buffer.push_str("  ");
        }
        if idx == last {
            buffer.push_str(cell);
        } else {
            let width = widths[idx];
            let _ = write!(buffer, "{cell:<width$}");
        }
    }
    buffer.push('\n');
}

fn append_separator(buffer: &mut String, widths: &[usize]) {
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            buffer.push_str("  ");
        }
        buffer.push_str(&"-".repeat(*width));
    }
    buffer.push('\n');
}

fn format_source(source: TargetLevelSource) -> &'static str {
    match source {
        TargetLevelSource::Extension => "extension",
        TargetLevelSource::LanguageLevel => "language-level",
        TargetLevelSource::ProjectDefault => "plugin-default",
        TargetLevelSource::Baseline => "baseline",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(module: &str, options: &[&str]) -> ModuleOutcome {
        ModuleOutcome {
            module: module.to_string(),
            project: "org.example:core".to_string(),
            compiler_id: "javac".to_string(),
            backend: "Javac".to_string(),
            options: options.iter().map(|option| option.to_string()).collect(),
            target: "17".to_string(),
            target_source: TargetLevelSource::LanguageLevel,
        }
    }

    #[test]
    fn table_lists_every_module() {
        let modules = vec![outcome("core", &["-parameters"]), outcome("core.test", &[])];
        let table = render_module_table(&modules);
        let lines = table.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("module"));
        assert!(lines[2].starts_with("core "));
        assert!(lines[2].ends_with("-parameters"));
        assert!(lines[3].contains("language-level"));
        assert!(lines[3].ends_with('-'));
    }

    #[test]
    fn non_ascii_module_names_keep_columns_aligned() {
        let modules = vec![outcome("modulé", &[]), outcome("core", &[])];
        let table = render_module_table(&modules);
        let compiler_column = |line: &str| line.chars().position(|c| c == 'j');
        let lines = table.lines().collect::<Vec<_>>();

        assert_eq!(compiler_column(lines[2]), compiler_column(lines[3]));
        assert_eq!(lines[1].split("  ").next().map(str::len), Some("modulé".chars().count()));
    }

    #[test]
    fn error_chain_lists_each_cause_once() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = ManifestError::Io {
            path: "mci.toml".into(),
            source: io,
        };
        assert_eq!(error_chain(&error), "failed to read mci.toml: no such file");
    }
}
