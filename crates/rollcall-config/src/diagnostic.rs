// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics.
//!
//! Unknown keys get a "did you mean?" hint ranked by Jaro-Winkler similarity,
//! and both unknown keys and mistyped values are pointed at in the TOML file
//! they came from whenever that file is known.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Below this score a suggestion is more noise than help.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem found at startup.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no section of `rollcall.toml` accepts.
    #[error("unknown configuration key `{key}` in {}", section_label(section))]
    #[diagnostic(
        code(rollcall::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        section: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(rollcall::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(rollcall::config::missing_key),
        help("add `{key} = <value>` to your rollcall.toml")
    )]
    MissingKey { key: String },

    /// A value deserialized but fails a semantic check.
    #[error("validation error: {message}")]
    #[diagnostic(code(rollcall::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(rollcall::config::other))]
    Other(String),
}

fn section_label(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

fn dotted(path: &[String]) -> String {
    path.join(".")
}

/// TOML documents that took part in a failed extraction, as `(path, content)`.
struct TomlSources<'a>(&'a [(String, String)]);

impl<'a> TomlSources<'a> {
    /// The document an error was read from. Inline strings carry no file
    /// name, so a lone source is assumed to be the culprit.
    fn origin(&self, error: &figment::Error) -> Option<&'a (String, String)> {
        let file = error.metadata.as_ref().and_then(|m| match m.source.as_ref()? {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
        match file {
            Some(file) => self.0.iter().find(|(path, _)| *path == file),
            None if self.0.len() == 1 => self.0.first(),
            None => None,
        }
    }

    /// Span of `key` inside `section` of the error's document.
    fn locate(
        &self,
        error: &figment::Error,
        section: &[String],
        key: &str,
    ) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        let Some((path, content)) = self.origin(error) else {
            return (None, None);
        };
        match find_key_offset(content, section, key) {
            Some(offset) => (
                Some(SourceSpan::new(offset.into(), key.len())),
                Some(NamedSource::new(path, content.clone())),
            ),
            None => (None, None),
        }
    }
}

/// Expand a figment error, which may bundle several failures, into diagnostics.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    let sources = TomlSources(toml_sources);
    err.into_iter()
        .map(|error| convert(&error, &sources))
        .collect()
}

fn convert(error: &figment::Error, sources: &TomlSources<'_>) -> ConfigError {
    let path: Vec<String> = error.path.clone();

    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let (span, src) = sources.locate(error, &path, field);
            ConfigError::UnknownKey {
                key: field.clone(),
                section: dotted(&path),
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => {
            let mut full = path.clone();
            full.push(field.to_string());
            ConfigError::MissingKey { key: dotted(&full) }
        }
        Kind::InvalidType(actual, expected) => {
            let (span, src) = match path.split_last() {
                Some((key, section)) => sources.locate(error, section, key),
                None => (None, None),
            };
            ConfigError::InvalidType {
                key: dotted(&path),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.clone(),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Byte offset of `field` within the `[section]` table of `content`.
///
/// An empty section searches the top of the document. The search stops at
/// the next table header so a same-named key in a later table never matches.
pub fn find_key_offset(content: &str, section: &[String], field: &str) -> Option<usize> {
    let start = if section.is_empty() {
        0
    } else {
        let header = format!("[{}]", dotted(section));
        content.find(&header)? + header.len()
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let body = line.trim_start();
        if body.starts_with('[') {
            break;
        }
        let is_key = body
            .strip_prefix(field)
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if is_key {
            return Some(offset + (line.len() - body.len()));
        }
        offset += line.len();
    }

    None
}

/// Closest valid key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|&(_, score)| score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Print every error to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut report = String::new();
        match handler.render_report(&mut report, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{report}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
