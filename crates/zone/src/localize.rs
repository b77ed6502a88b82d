//! Localized string resources
//!
//! A `localize,<name>` manifest line first looks for
//! `localizedstrings/<name>.str` and then `localizedstrings/<name>.json` in
//! the zone's asset tree. Each entry found becomes its own `localize` asset.

use std::path::{Path, PathBuf};
use zonekit_core::{Error, LocalizeEntry, Result};

/// Folder of string resources under a zone's asset directory
pub const LOCALIZED_STRINGS_DIR: &str = "localizedstrings";

/// Resource file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceFormat {
    /// `REFERENCE`/`LANG_ENGLISH` pairs
    Str,
    /// Flat JSON object of key to value
    Json,
}

/// Locate the resource file for `name`, `.str` first
pub fn find_resource(zone_dir: &Path, name: &str) -> Option<(PathBuf, ResourceFormat)> {
    let dir = zone_dir.join(LOCALIZED_STRINGS_DIR);
    [("str", ResourceFormat::Str), ("json", ResourceFormat::Json)]
        .into_iter()
        .map(|(ext, format)| (dir.join(format!("{}.{}", name, ext)), format))
        .find(|(path, _)| path.is_file())
}

/// Parse a resource file into `(key, entry)` pairs, in file order
pub fn load_resource(path: &Path, format: ResourceFormat, name: &str) -> Result<Vec<(String, LocalizeEntry)>> {
    let text = std::fs::read_to_string(path)?;
    match format {
        ResourceFormat::Str => parse_str(&text, name),
        ResourceFormat::Json => parse_json(&text),
    }
}

/// Parse a `.str` file; keys become `<NAME>_<REFERENCE>` in uppercase
pub fn parse_str(text: &str, name: &str) -> Result<Vec<(String, LocalizeEntry)>> {
    let prefix = name.to_ascii_uppercase();
    let mut entries = Vec::new();
    let mut reference: Option<String> = None;

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };
        match keyword {
            "REFERENCE" => {
                if rest.is_empty() {
                    return Err(Error::Serialization(format!("line {}: REFERENCE without a name", i + 1)));
                }
                reference = Some(rest.to_ascii_uppercase());
            }
            "LANG_ENGLISH" => {
                let Some(key) = reference.take() else {
                    return Err(Error::Serialization(format!(
                        "line {}: LANG_ENGLISH without a REFERENCE",
                        i + 1
                    )));
                };
                let value = unquote(rest).ok_or_else(|| {
                    Error::Serialization(format!("line {}: unterminated string", i + 1))
                })?;
                entries.push((format!("{}_{}", prefix, key), LocalizeEntry { value }));
            }
            // VERSION, CONFIG, FILENOTES, ENDMARKER and other languages
            _ => {}
        }
    }
    Ok(entries)
}

fn unquote(s: &str) -> Option<String> {
    let inner = s.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => return None,
        }
    }
    Some(out)
}

/// Parse a flat JSON object of key to string value
pub fn parse_json(text: &str) -> Result<Vec<(String, LocalizeEntry)>> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)?;
    object
        .into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(value) => Ok((key, LocalizeEntry { value })),
            other => Err(Error::Serialization(format!(
                "localize key {} holds {}, expected a string",
                key, other
            ))),
        })
        .collect()
}
