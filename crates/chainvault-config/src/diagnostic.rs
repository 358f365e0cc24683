// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! miette diagnostics for configuration errors.
//!
//! Figment reports problems as a flat error chain. Each entry becomes one
//! [`ConfigError`]; unknown keys additionally get a source span pointing
//! into the TOML file and a "did you mean" hint ranked by Jaro-Winkler.

#![allow(unused_assignments)] // emitted by the miette Diagnostic derive

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Lowest Jaro-Winkler score that still counts as a plausible typo.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(chainvault::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest valid key, when one is similar enough.
        suggestion: Option<String>,
        /// Comma-separated keys accepted in the same table.
        valid_keys: String,
        #[label("not a chainvault setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(chainvault::config::invalid_value), help("expected {expected}"))]
    InvalidValue {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(chainvault::config::missing_key),
        help("set `{key}` in chainvault.toml")
    )]
    MissingKey { key: String },

    /// A value that parsed but is out of range.
    #[error("validation error: {message}")]
    #[diagnostic(code(chainvault::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(chainvault::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(key) => format!("did you mean `{key}`? accepted keys: {valid_keys}"),
        None => format!("accepted keys: {valid_keys}"),
    }
}

/// Turn every error in a figment chain into a diagnostic.
///
/// `toml_sources` pairs each file name with its content so unknown keys can
/// be underlined.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, toml_sources))
        .collect()
}

fn convert(error: &figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    let dotted = error.path.join(".");
    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let (span, src) = match locate_unknown_key(error, field, toml_sources) {
                Some((span, src)) => (Some(span), Some(src)),
                None => (None, None),
            };
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.to_string(),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidValue {
            key: dotted,
            detail: format!("found {actual}"),
            expected: expected.clone(),
        },
        Kind::UnknownVariant(variant, expected) => ConfigError::InvalidValue {
            key: dotted,
            detail: format!("unknown variant `{variant}`"),
            expected: format!("one of: {}", expected.join(", ")),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Underline `field` in the file the error came from.
///
/// Errors from an inline string carry no file metadata; if exactly one
/// source was supplied it is assumed to be that string.
fn locate_unknown_key(
    error: &figment::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let (name, content) = match file {
        Some(file) => toml_sources.iter().find(|(name, _)| *name == file)?,
        None if toml_sources.len() == 1 => &toml_sources[0],
        None => return None,
    };

    let offset = find_key_offset(content, &error.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `field` as a key inside the table named by `path`.
///
/// Only the first path segment is used to find the `[table]` header; a
/// top-level key is searched from the start of the document.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        Some(table) => {
            let header = format!("[{table}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut line_start = start;
    for line in content[start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];
        let is_key = rest
            .strip_prefix(field)
            .is_some_and(|after| after.starts_with([' ', '\t', '=']));
        if is_key {
            return Some(line_start + indent);
        }
        line_start += line.len();
    }
    None
}

/// The valid key most similar to `unknown`, if any clears the threshold.
pub fn suggest_key<S: AsRef<str>>(unknown: &str, valid_keys: &[S]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key.as_ref()), key.as_ref()))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr with miette's graphical report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_vault_key() {
        let valid = ["default_path", "kdf_profile", "kdf_parallelism"];
        assert_eq!(suggest_key("kdf_profil", &valid).as_deref(), Some("kdf_profile"));
    }

    #[test]
    fn suggests_log_level() {
        assert_eq!(
            suggest_key("log_levle", &["log_level"]).as_deref(),
            Some("log_level")
        );
    }

    #[test]
    fn distant_typo_has_no_suggestion() {
        assert_eq!(suggest_key("zzzzzz", &["default_path", "kdf_profile"]), None);
    }

    #[test]
    fn key_offset_is_found_inside_its_table() {
        let content = "[logging]\nlog_level = \"info\"\n[vault]\ndefualt_path = \"x\"\n";
        let path = ["vault".to_string()];
        let offset = find_key_offset(content, &path, "defualt_path").unwrap();
        assert_eq!(&content[offset..offset + 12], "defualt_path");
    }

    #[test]
    fn key_offset_survives_crlf_and_indent() {
        let content = "[vault]\r\nfoo = 1\r\n  bar = 2\r\n";
        let path = ["vault".to_string()];
        let offset = find_key_offset(content, &path, "bar").unwrap();
        assert_eq!(&content[offset..offset + 3], "bar");
    }

    #[test]
    fn prefix_of_longer_key_is_not_matched() {
        let content = "[vault]\nkdf_profile_x = 1\n";
        assert_eq!(find_key_offset(content, &["vault".to_string()], "kdf_profile"), None);
    }

    #[test]
    fn unknown_key_help_lists_keys() {
        let help = unknown_key_help(Some("log_level"), "log_level");
        assert!(help.contains("did you mean `log_level`"));
        assert_eq!(unknown_key_help(None, "a, b"), "accepted keys: a, b");
    }
}
