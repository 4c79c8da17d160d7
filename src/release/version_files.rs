//! Version string substitution in project files.
//!
//! A declaration file maps repository paths to one or more placeholders.
//! In each placeholder the token `x.x.x` (or `X.X.X`) marks where the version
//! sits, for example `"version": "x.x.x"`. Declarations are JSON by default,
//! or TOML when the file name ends in `.toml`:
//!
//! ```json
//! {
//!   "./package.json": "\"version\": \"x.x.x\"",
//!   "./lib/version.rb": ["VERSION = 'x.x.x'", "X.X.X-SNAPSHOT"]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex_lite::{NoExpand, Regex};
use serde_json::Value;
use toml_edit::{DocumentMut, Item};

use crate::error::VersionFileError;

/// Matches a release version in file content.
pub const VERSION_PATTERN: &str = r"\d+\.\d+\.\d+(?:-\w*\.\d+)?";

static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"x\.x\.x|X\.X\.X").expect("token pattern is valid"));

/// A file and the placeholders to update in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLocation {
    pub path: String,
    pub placeholders: Vec<String>,
}

/// Parse a declaration file, picking the format from its path.
///
/// Locations come back in declaration order, which is the order their
/// placeholders are applied in.
pub fn parse_declarations(
    path: &str,
    content: &str,
) -> Result<Vec<VersionLocation>, VersionFileError> {
    if path.ends_with(".toml") {
        parse_toml_declarations(path, content)
    } else {
        parse_json_declarations(path, content)
    }
}

fn parse_json_declarations(
    path: &str,
    content: &str,
) -> Result<Vec<VersionLocation>, VersionFileError> {
    let value: Value = serde_json::from_str(content).map_err(|e| VersionFileError::InvalidJson {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    let Value::Object(map) = value else {
        return Err(VersionFileError::InvalidJson {
            path: path.to_string(),
            reason: "expected an object of file paths".to_string(),
        });
    };

    map.into_iter()
        .map(|(file, entry)| {
            let placeholders = match entry {
                Value::String(s) => vec![s],
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s),
                        _ => Err(invalid_entry(path, &file)),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                _ => return Err(invalid_entry(path, &file)),
            };
            Ok(VersionLocation {
                path: file,
                placeholders,
            })
        })
        .collect()
}

fn parse_toml_declarations(
    path: &str,
    content: &str,
) -> Result<Vec<VersionLocation>, VersionFileError> {
    let doc: DocumentMut = content
        .parse()
        .map_err(|e: toml_edit::TomlError| VersionFileError::InvalidToml {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    doc.iter()
        .map(|(file, item)| {
            let placeholders = match item {
                Item::Value(toml_edit::Value::String(s)) => vec![s.value().clone()],
                Item::Value(toml_edit::Value::Array(items)) => items
                    .iter()
                    .map(|v| {
                        v.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| invalid_entry(path, file))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                _ => return Err(invalid_entry(path, file)),
            };
            Ok(VersionLocation {
                path: file.to_string(),
                placeholders,
            })
        })
        .collect()
}

fn invalid_entry(path: &str, file: &str) -> VersionFileError {
    VersionFileError::InvalidEntry {
        path: path.to_string(),
        file: file.to_string(),
    }
}

/// Strip a leading `./` so declared paths match repository paths.
pub fn normalize_path(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path)
}

/// Build the search pattern and replacement text for one placeholder.
fn compile_placeholder(
    placeholder: &str,
    version: &str,
) -> Result<(Regex, String), VersionFileError> {
    if !VERSION_TOKEN.is_match(placeholder) {
        return Err(VersionFileError::MissingToken(placeholder.to_string()));
    }

    let literals: Vec<&str> = VERSION_TOKEN.split(placeholder).collect();

    let pattern = literals
        .iter()
        .map(|part| regex_lite::escape(part))
        .collect::<Vec<_>>()
        .join(VERSION_PATTERN);
    let replacement = literals.join(version);

    let regex = Regex::new(&pattern).map_err(|e| VersionFileError::InvalidPattern {
        placeholder: placeholder.to_string(),
        reason: e.to_string(),
    })?;

    Ok((regex, replacement))
}

/// Apply every placeholder in order. Text that does not match is left alone.
pub fn apply_placeholders(
    content: &str,
    placeholders: &[String],
    version: &str,
) -> Result<String, VersionFileError> {
    let mut updated = content.to_string();
    for placeholder in placeholders {
        let (regex, replacement) = compile_placeholder(placeholder, version)?;
        updated = regex
            .replace_all(&updated, NoExpand(&replacement))
            .into_owned();
    }
    Ok(updated)
}

/// Compute the new content of every declared file found in `current`.
///
/// `current` is keyed by normalized path. Declared files that are absent are
/// skipped. Files whose content would not change are left out of the result.
pub fn compute_replacements(
    locations: &[VersionLocation],
    current: &HashMap<String, String>,
    version: &str,
) -> Result<BTreeMap<String, String>, VersionFileError> {
    let mut changed: BTreeMap<String, String> = BTreeMap::new();

    for location in locations {
        let path = normalize_path(&location.path);
        let Some(content) = changed.get(path).or_else(|| current.get(path)) else {
            continue;
        };

        let updated = apply_placeholders(content, &location.placeholders, version)?;
        if current.get(path) != Some(&updated) {
            changed.insert(path.to_string(), updated);
        } else {
            changed.remove(path);
        }
    }

    Ok(changed)
}
