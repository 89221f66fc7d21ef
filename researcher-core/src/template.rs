//! `.env` template rendering and linting
//!
//! The template documents every variable of the environment contract. The
//! linter checks an env file against it: each line must parse as
//! `KEY=value`, each documented variable may appear at most once, and
//! enumerated values must be one of their allowed options.

use crate::env::{self, is_placeholder, unprefixed};
use crate::types::{LlmProvider, SearchProvider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

struct TemplateEntry {
    name: &'static str,
    value: &'static str,
    comment: Option<&'static str>,
}

const fn entry(name: &'static str, value: &'static str) -> TemplateEntry {
    TemplateEntry {
        name,
        value,
        comment: None,
    }
}

const fn commented(
    name: &'static str,
    value: &'static str,
    comment: &'static str,
) -> TemplateEntry {
    TemplateEntry {
        name,
        value,
        comment: Some(comment),
    }
}

const PREAMBLE: [&str; 2] = [
    "# Any variable may be prefixed with DR_ (e.g. DR_OPENAI_API_KEY) to avoid",
    "# collisions with other variables in your environment. DR_ names take precedence.",
];

const SECTIONS: [(&str, &[TemplateEntry]); 4] = [
    (
        "LLM api keys",
        &[
            entry(env::OPENAI_API_KEY, "<your_key>"),
            entry(env::DEEPSEEK_API_KEY, "<your_key>"),
            entry(env::OPENROUTER_API_KEY, "<your_key>"),
            entry(env::GEMINI_API_KEY, "<your_key>"),
            entry(env::ANTHROPIC_API_KEY, "<your_key>"),
            entry(env::PERPLEXITY_API_KEY, "<your_key>"),
            entry(env::HUGGINGFACE_API_KEY, "<your_key>"),
            commented(
                env::LOCAL_MODEL_URL,
                "<your_local_model_url>",
                "OpenAI-compatible endpoint, e.g. http://localhost:11434/v1",
            ),
        ],
    ),
    (
        "Search provider",
        &[
            commented(env::SEARCH_PROVIDER, "serper", "serper or openai"),
            entry(env::SERPER_API_KEY, "<your_key>"),
        ],
    ),
    (
        "Azure AI Search",
        &[
            commented(
                env::AZURE_SEARCH_ENDPOINT,
                "<your_service_endpoint>",
                "e.g. contoso.search.windows.net",
            ),
            entry(env::AZURE_SEARCH_KEY, "<your_key>"),
            entry(env::AZURE_SEARCH_INDEX_NAME, "<your_index_name>"),
        ],
    ),
    (
        "Selected LLM models",
        &[
            entry(env::REASONING_MODEL_PROVIDER, "openai"),
            entry(env::REASONING_MODEL, "o3-mini"),
            entry(env::MAIN_MODEL_PROVIDER, "openai"),
            entry(env::MAIN_MODEL, "gpt-4o"),
            entry(env::FAST_MODEL_PROVIDER, "openai"),
            entry(env::FAST_MODEL, "gpt-4o-mini"),
        ],
    ),
];

/// Render the canonical `.env.example`
pub fn render_template() -> String {
    let mut out = String::new();
    for line in PREAMBLE {
        out.push_str(line);
        out.push('\n');
    }
    for (title, entries) in SECTIONS {
        out.push('\n');
        out.push_str("# ");
        out.push_str(title);
        out.push('\n');
        for entry in entries {
            out.push_str(entry.name);
            out.push('=');
            out.push_str(entry.value);
            if let Some(comment) = entry.comment {
                out.push_str("  # ");
                out.push_str(comment);
            }
            out.push('\n');
        }
    }
    out
}

/// One `KEY=value` assignment from an env file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvLine {
    /// 1-based line number
    pub line: usize,
    pub key: String,
    pub value: String,
}

/// A lint finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintIssue {
    pub line: Option<usize>,
    pub key: Option<String>,
    pub message: String,
}

/// Result of parsing env file content
#[derive(Debug, Clone, Default)]
pub struct ParsedEnv {
    pub entries: Vec<EnvLine>,
    pub malformed: Vec<LintIssue>,
}

impl ParsedEnv {
    /// Entries as a lookup source, later assignments winning
    pub fn to_env(&self) -> env::MapEnv {
        self.entries
            .iter()
            .map(|e| (e.key.clone(), e.value.clone()))
            .collect()
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_value(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    let Some(quote) = raw.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        let end = raw
            .char_indices()
            .find(|(i, c)| *c == '#' && (*i == 0 || raw[..*i].ends_with([' ', '\t'])))
            .map(|(i, _)| i)
            .unwrap_or(raw.len());
        return Ok(raw[..end].trim_end().to_string());
    };

    let body = &raw[1..];
    let close = body
        .find(quote)
        .ok_or_else(|| format!("unterminated {} quote", quote))?;
    let rest = body[close + 1..].trim();
    if !rest.is_empty() && !rest.starts_with('#') {
        return Err(format!("unexpected text after quoted value: {}", rest));
    }
    Ok(body[..close].to_string())
}

/// Parse env file content into assignments
///
/// Blank lines and `#` comments are skipped and an `export ` prefix is
/// accepted. Unquoted values lose trailing ` # comments`.
pub fn parse_env_lines(content: &str) -> ParsedEnv {
    let mut parsed = ParsedEnv::default();

    for (index, raw_line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            parsed.malformed.push(LintIssue {
                line: Some(line_no),
                key: None,
                message: format!("expected KEY=value, found '{}'", line),
            });
            continue;
        };

        let key = key.trim();
        if !is_valid_key(key) {
            parsed.malformed.push(LintIssue {
                line: Some(line_no),
                key: Some(key.to_string()),
                message: format!("invalid variable name '{}'", key),
            });
            continue;
        }

        match parse_value(value) {
            Ok(value) => parsed.entries.push(EnvLine {
                line: line_no,
                key: key.to_string(),
                value,
            }),
            Err(message) => parsed.malformed.push(LintIssue {
                line: Some(line_no),
                key: Some(key.to_string()),
                message,
            }),
        }
    }

    parsed
}

/// Result of linting env file content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintReport {
    pub errors: Vec<LintIssue>,
    pub warnings: Vec<LintIssue>,
    /// Documented variables that do not appear in the file
    pub missing: Vec<String>,
}

impl LintReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether every documented variable is declared
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Lint env file content against the documented contract
pub fn lint_env_file(content: &str) -> LintReport {
    let parsed = parse_env_lines(content);
    let mut report = LintReport {
        errors: parsed.malformed.clone(),
        ..LintReport::default()
    };

    let mut occurrences: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for entry in &parsed.entries {
        let name = unprefixed(&entry.key);
        if !env::is_known_variable(&entry.key) {
            report.warnings.push(LintIssue {
                line: Some(entry.line),
                key: Some(entry.key.clone()),
                message: format!("'{}' is not a documented variable", entry.key),
            });
            continue;
        }
        occurrences.entry(name).or_default().push(entry.line);

        if let Some(message) = check_value(name, &entry.value) {
            report.errors.push(LintIssue {
                line: Some(entry.line),
                key: Some(entry.key.clone()),
                message,
            });
        }
    }

    for (name, lines) in &occurrences {
        if lines.len() > 1 {
            report.errors.push(LintIssue {
                line: lines.get(1).copied(),
                key: Some(name.to_string()),
                message: format!(
                    "'{}' is declared {} times (lines {})",
                    name,
                    lines.len(),
                    lines
                        .iter()
                        .map(|l| l.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            });
        }
    }

    for name in env::ALL_VARIABLES {
        if !occurrences.contains_key(name) {
            report.missing.push(name.to_string());
            report.warnings.push(LintIssue {
                line: None,
                key: Some(name.to_string()),
                message: format!("'{}' is not declared", name),
            });
        }
    }

    report
}

fn check_value(name: &str, value: &str) -> Option<String> {
    if value.is_empty() || is_placeholder(value) {
        return None;
    }
    if name == env::SEARCH_PROVIDER {
        return value.parse::<SearchProvider>().err().map(|e| e.to_string());
    }
    if name.ends_with("_MODEL_PROVIDER") {
        return value.parse::<LlmProvider>().err().map(|e| e.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_complete_and_clean() {
        let report = lint_env_file(&render_template());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.is_complete(), "missing: {:?}", report.missing);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    }

    #[test]
    fn test_template_declares_each_variable_once() {
        let parsed = parse_env_lines(&render_template());
        assert!(parsed.malformed.is_empty());
        assert_eq!(parsed.entries.len(), env::ALL_VARIABLES.len());
        for (entry, name) in parsed.entries.iter().zip(env::ALL_VARIABLES) {
            assert_eq!(entry.key, name);
        }
    }

    #[test]
    fn test_shipped_example_matches_template() {
        assert_eq!(include_str!("../../.env.example"), render_template());
    }

    #[test]
    fn test_search_provider_hint_is_stripped() {
        let parsed = parse_env_lines("SEARCH_PROVIDER=serper  # serper or openai\n");
        assert_eq!(parsed.entries[0].value, "serper");
    }

    #[test]
    fn test_comment_only_value_is_empty() {
        let content = "SEARCH_PROVIDER=  # serper or openai\nOPENAI_API_KEY=   # fill me in\n";
        let parsed = parse_env_lines(content);
        assert!(parsed.malformed.is_empty(), "{:?}", parsed.malformed);
        assert_eq!(parsed.entries[0].value, "");
        assert_eq!(parsed.entries[1].value, "");

        let report = lint_env_file(content);
        assert!(report.is_valid(), "{:?}", report.errors);

        let config = crate::config::ResearcherConfig::from_env(&parsed.to_env()).unwrap();
        assert_eq!(config.search.provider, SearchProvider::Serper);
        assert!(config.api_keys.get(LlmProvider::OpenAi).is_none());
    }

    #[test]
    fn test_parse_quotes_export_and_hash_in_value() {
        let parsed = parse_env_lines(
            "export MAIN_MODEL=\"gpt-4o\" # main\nAZURE_SEARCH_KEY='abc#def'\nLOCAL_MODEL_URL=http://host/#frag\n",
        );
        assert!(parsed.malformed.is_empty(), "{:?}", parsed.malformed);
        assert_eq!(parsed.entries[0].key, "MAIN_MODEL");
        assert_eq!(parsed.entries[0].value, "gpt-4o");
        assert_eq!(parsed.entries[1].value, "abc#def");
        assert_eq!(parsed.entries[2].value, "http://host/#frag");
    }

    #[test]
    fn test_malformed_lines_are_reported_with_line_numbers() {
        let report = lint_env_file("OPENAI_API_KEY=sk\nnot a pair\n1BAD=value\nFAST_MODEL=\"open\n");
        let lines: Vec<Option<usize>> = report.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![Some(2), Some(3), Some(4)]);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_duplicates_count_prefixed_names() {
        let report = lint_env_file("SERPER_API_KEY=a\nDR_SERPER_API_KEY=b\n");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].key.as_deref(), Some("SERPER_API_KEY"));
        assert!(report.errors[0].message.contains("2 times"));
    }

    #[test]
    fn test_invalid_enumerated_values() {
        let report = lint_env_file("SEARCH_PROVIDER=bing\nMAIN_MODEL_PROVIDER=mistral\n");
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].message.contains("serper or openai"));
        assert_eq!(report.errors[1].line, Some(2));
    }

    #[test]
    fn test_unknown_and_missing_are_warnings() {
        let report = lint_env_file("DATABASE_URL=postgres://localhost\nOPENAI_API_KEY=sk\n");
        assert!(report.is_valid());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.key.as_deref() == Some("DATABASE_URL")));
        assert_eq!(report.missing.len(), env::ALL_VARIABLES.len() - 1);
        assert!(!report.missing.contains(&"OPENAI_API_KEY".to_string()));
    }
}
