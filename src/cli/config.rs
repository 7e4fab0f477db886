use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use usc_emitter::{NewLine, TranspileOptions};

use super::args::CliArgs;

/// Project file looked up in the working directory when no inputs are given.
pub const PROJECT_FILE_NAME: &str = "usc.json";

/// Accepts `true` as well as `"true"`, `"yes"`, `"1"` and their negations.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

/// Contents of a `usc.json` file.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub transpiler_options: Option<TranspilerOptionsConfig>,
    /// Dump files or directories, relative to the project file.
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub out_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TranspilerOptionsConfig {
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub best_effort: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub remove_comments: Option<bool>,
    #[serde(default)]
    pub indent_size: Option<u32>,
    #[serde(default)]
    pub new_line: Option<NewLine>,
    #[serde(default)]
    pub reserved_word_prefix: Option<String>,
}

/// Everything the driver needs, with paths made absolute.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub options: TranspileOptions,
    pub inputs: Vec<PathBuf>,
    pub out_dir: Option<PathBuf>,
}

/// Parse `usc.json` text. Comments and trailing commas are tolerated.
pub fn parse_project_config(source: &str) -> Result<ProjectConfig> {
    let normalized = normalize_jsonc(source);
    let config = serde_json::from_str(&normalized).context("failed to parse usc.json")?;
    Ok(config)
}

pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read project file: {}", path.display()))?;
    parse_project_config(&source)
        .with_context(|| format!("failed to parse project file: {}", path.display()))
}

/// Apply file options over the defaults.
pub fn resolve_transpile_options(
    options: Option<&TranspilerOptionsConfig>,
) -> Result<TranspileOptions> {
    let mut resolved = TranspileOptions::default();
    let Some(options) = options else {
        return Ok(resolved);
    };

    if let Some(best_effort) = options.best_effort {
        resolved.best_effort = best_effort;
    }
    if let Some(remove_comments) = options.remove_comments {
        resolved.remove_comments = remove_comments;
    }
    if let Some(indent_size) = options.indent_size {
        if indent_size == 0 || indent_size > 16 {
            bail!("indentSize must be between 1 and 16, got {indent_size}");
        }
        resolved.indent_size = indent_size;
    }
    if let Some(new_line) = options.new_line {
        resolved.new_line = new_line;
    }
    if let Some(prefix) = &options.reserved_word_prefix {
        validate_prefix(prefix)?;
        resolved.reserved_word_prefix = prefix.clone();
    }
    Ok(resolved)
}

fn validate_prefix(prefix: &str) -> Result<()> {
    let valid = !prefix.is_empty()
        && prefix
            .chars()
            .enumerate()
            .all(|(i, c)| c == '_' || c.is_alphanumeric() || (i == 0 && c == '@'));
    if !valid {
        bail!("reservedWordPrefix must be '@' or an identifier prefix, got '{prefix}'");
    }
    Ok(())
}

/// Combine the project file (if any) with command-line flags. Flags win.
pub fn resolve_config(args: &CliArgs, cwd: &Path) -> Result<ResolvedConfig> {
    let project_path = match &args.project {
        Some(project) => {
            let path = cwd.join(project);
            if path.is_dir() {
                Some(path.join(PROJECT_FILE_NAME))
            } else {
                Some(path)
            }
        }
        None if args.inputs.is_empty() => {
            let candidate = cwd.join(PROJECT_FILE_NAME);
            candidate.is_file().then_some(candidate)
        }
        None => None,
    };

    let (project, base_dir) = match &project_path {
        Some(path) => {
            let config = load_project_config(path)?;
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| anyhow!("project file has no parent directory"))?;
            (config, base_dir)
        }
        None => (ProjectConfig::default(), cwd.to_path_buf()),
    };

    let mut options = resolve_transpile_options(project.transpiler_options.as_ref())?;
    if args.best_effort {
        options.best_effort = true;
    }
    if args.remove_comments {
        options.remove_comments = true;
    }
    if let Some(indent) = args.indent {
        options.indent_size = indent;
    }
    if let Some(new_line) = args.new_line {
        options.new_line = new_line.into();
    }
    if let Some(prefix) = &args.reserved_word_prefix {
        validate_prefix(prefix)?;
        options.reserved_word_prefix = prefix.clone();
    }

    let inputs: Vec<PathBuf> = if !args.inputs.is_empty() {
        args.inputs.iter().map(|input| cwd.join(input)).collect()
    } else {
        project
            .include
            .iter()
            .flatten()
            .map(|entry| base_dir.join(entry))
            .collect()
    };
    if inputs.is_empty() {
        match &project_path {
            Some(path) => bail!("{} lists no inputs", path.display()),
            None => bail!("no inputs given and no {PROJECT_FILE_NAME} found"),
        }
    }

    let out_dir = match (&args.out_dir, &project.out_dir) {
        (Some(dir), _) => Some(cwd.join(dir)),
        (None, Some(dir)) => Some(base_dir.join(dir)),
        (None, None) => None,
    };

    Ok(ResolvedConfig {
        options,
        inputs,
        out_dir,
    })
}

/// Drop `//` and `/* */` comments, then trailing commas, outside strings.
fn normalize_jsonc(input: &str) -> String {
    drop_trailing_commas(&strip_comments(input))
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

fn drop_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let mut lookahead = chars.clone();
            while lookahead.peek().is_some_and(|c| c.is_whitespace()) {
                lookahead.next();
            }
            if matches!(lookahead.peek(), Some('}' | ']')) {
                continue;
            }
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_comments_and_trailing_commas() {
        let input = "{\n  // note\n  \"a\": \"x//y\", /* b */\n  \"c\": [1, 2,], // last\n}";
        let normalized = normalize_jsonc(input);
        let value: serde_json::Value = serde_json::from_str(&normalized).unwrap();
        assert_eq!(value["a"], "x//y");
        assert_eq!(value["c"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_bool_accepts_strings() {
        let opts: TranspilerOptionsConfig =
            serde_json::from_str(r#"{"bestEffort": "yes", "removeComments": false}"#).unwrap();
        assert_eq!(opts.best_effort, Some(true));
        assert_eq!(opts.remove_comments, Some(false));
    }

    #[test]
    fn test_bool_rejects_garbage() {
        let result: std::result::Result<TranspilerOptionsConfig, serde_json::Error> =
            serde_json::from_str(r#"{"bestEffort": "maybe"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_prefix_validation() {
        assert!(validate_prefix("@").is_ok());
        assert!(validate_prefix("_").is_ok());
        assert!(validate_prefix("kw_").is_ok());
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("a@").is_err());
        assert!(validate_prefix("-").is_err());
    }
}
