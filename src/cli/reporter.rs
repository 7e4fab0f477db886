use colored::Colorize;

use usc_common::{OrphanComment, SourcePosition, UnsupportedConstruct, Warning};

use super::driver::{ModuleReport, TranspileResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Error,
    Warning,
}

pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    /// One line per diagnostic, modules in input order.
    pub fn render(&self, result: &TranspileResult) -> String {
        let mut lines = Vec::new();
        for module in &result.modules {
            self.collect_module(module, &mut lines);
        }
        lines.join("\n")
    }

    fn collect_module(&self, module: &ModuleReport, lines: &mut Vec<String>) {
        if let Some(error) = &module.error {
            lines.push(self.format_line(&module.file_name, Category::Error, error));
        }
        for item in &module.diagnostics.unsupported {
            lines.push(self.format_unsupported(item, &module.file_name));
        }
        for item in &module.diagnostics.orphan_comments {
            lines.push(self.format_orphan(item));
        }
        for item in &module.diagnostics.warnings {
            lines.push(self.format_warning(item, &module.file_name));
        }
    }

    pub fn format_unsupported(&self, item: &UnsupportedConstruct, file: &str) -> String {
        let location = self.format_location(item.position.as_ref(), file);
        let message = format!("unsupported {}: {}", item.node_kind, item.description);
        self.format_line(&location, Category::Error, &message)
    }

    pub fn format_orphan(&self, item: &OrphanComment) -> String {
        let location = self.format_location(Some(&item.position), &item.position.file);
        let text = first_line(&item.text);
        let message = format!("comment could not be placed: {text}");
        self.format_line(&location, Category::Warning, &message)
    }

    pub fn format_warning(&self, item: &Warning, file: &str) -> String {
        let location = self.format_location(item.position.as_ref(), file);
        self.format_line(&location, Category::Warning, &item.message)
    }

    /// `Found 3 diagnostics in 2 files.`, or `None` for a clean run.
    pub fn format_summary(&self, result: &TranspileResult) -> Option<String> {
        let failed = result.failed_count();
        let count = result.diagnostics_count() + failed;
        if count == 0 {
            return None;
        }
        let files = result
            .modules
            .iter()
            .filter(|m| m.error.is_some() || !m.diagnostics.is_empty())
            .count();
        let summary = format!(
            "Found {count} {} in {files} {}.",
            plural(count, "diagnostic"),
            plural(files, "file")
        );
        if self.color {
            Some(summary.bold().to_string())
        } else {
            Some(summary)
        }
    }

    fn format_location(&self, position: Option<&SourcePosition>, file: &str) -> String {
        let location = match position {
            Some(pos) => format!("{}:{}:{}", pos.file, pos.line, pos.column),
            None if file.is_empty() => "<unknown>".to_string(),
            None => file.to_string(),
        };
        if self.color {
            location.cyan().to_string()
        } else {
            location
        }
    }

    fn format_line(&self, location: &str, category: Category, message: &str) -> String {
        format!("{location} - {}: {message}", self.format_category(category))
    }

    fn format_category(&self, category: Category) -> String {
        let label = match category {
            Category::Error => "error",
            Category::Warning => "warning",
        };
        if !self.color {
            return label.to_string();
        }
        match category {
            Category::Error => label.red().bold().to_string(),
            Category::Warning => label.yellow().bold().to_string(),
        }
    }
}

fn first_line(text: &str) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default().trim();
    if lines.next().is_some() {
        format!("{first} ...")
    } else {
        first.to_string()
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
