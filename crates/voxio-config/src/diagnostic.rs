// SPDX-FileCopyrightText: 2026 Voxio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Converts Figment deserialization errors into miette diagnostics that
//! point into the offending TOML file, list the valid keys for the
//! section, and offer a "did you mean?" correction via Jaro-Winkler
//! string similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a candidate must clear before it is offered as a
/// correction. High enough to filter noise, low enough to catch typos like
/// `intervall_ms` -> `interval_ms` and `basse_url` -> `base_url`.
const MIN_SUGGESTION_SCORE: f64 = 0.75;

/// A configuration error with rich diagnostic information.
///
/// Each variant carries what miette needs to render a readable report:
/// source spans, suggestions, and valid key listings.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(voxio::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The key as written in the file.
        key: String,
        /// Closest valid key, when one scores above the threshold.
        suggestion: Option<String>,
        /// Comma-separated valid keys for the section.
        valid_keys: String,
        /// Where the key sits in the source file.
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        /// File content for the span to point into.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(
        code(voxio::config::invalid_type),
        help("expected {expected}")
    )]
    InvalidType {
        /// Dotted path of the key with the wrong type.
        key: String,
        /// Description of the type mismatch.
        detail: String,
        /// What type was expected.
        expected: String,
        /// Where the value sits in the source file.
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        /// File content for the span to point into.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(voxio::config::missing_key),
        help("add `{key} = <value>` to your voxio.toml")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(voxio::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(voxio::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(candidate) => format!("did you mean `{candidate}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// A figment error can chain several underlying errors; each is classified
/// separately, with fuzzy suggestions and source spans attached to
/// unknown-field errors.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| classify(error, toml_sources))
        .collect()
}

fn classify(error: figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    use figment::error::Kind;

    match &error.kind {
        Kind::UnknownField(field, allowed) => {
            let (span, src) = locate_key(&error, field, toml_sources);
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, allowed),
                valid_keys: allowed.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.clone().into_owned(),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: error.path.join("."),
            detail: format!("found {actual}, expected {expected}"),
            expected: expected.to_string(),
            span: None,
            src: None,
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Resolve an unknown key to a span in the TOML file it came from.
///
/// Needs the error's figment metadata to name a file that appears in
/// `toml_sources`; returns no span otherwise (env-var and default layers
/// have no file to point into).
fn locate_key(
    error: &figment::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some(figment::Source::File(path)) =
        error.metadata.as_ref().and_then(|m| m.source.clone())
    else {
        return (None, None);
    };
    let path = path.display().to_string();

    let Some((_, content)) = toml_sources.iter().find(|(p, _)| *p == path) else {
        return (None, None);
    };

    match find_key_offset(content, &error.path, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` in `content`, scoped to the `[section]` named by
/// the first element of `path`. Top-level fields search from the start.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut pos = start;
    for line in content[start..].lines() {
        let key = line.trim_start();
        let indent = line.len() - key.len();
        if let Some(rest) = key.strip_prefix(field) {
            // Require a delimiter after the name so `interval` never
            // matches inside `interval_ms`.
            if rest.starts_with([' ', '\t', '=']) {
                return Some(pos + indent);
            }
        }
        pos += line.len() + 1;
    }

    None
}

/// Best fuzzy match for an unknown key among `valid_keys`, if any clears
/// the score threshold. Earlier candidates win ties.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .fold((MIN_SUGGESTION_SCORE, None), |(best, pick), &key| {
            let score = strsim::jaro_winkler(unknown, key);
            if score > best {
                (score, Some(key.to_string()))
            } else {
                (best, pick)
            }
        })
        .1
}

/// Render a list of `ConfigError`s to stderr using miette's graphical handler.
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
