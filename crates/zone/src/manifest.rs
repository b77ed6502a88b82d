//! Manifest line grammar
//!
//! A manifest is a line-oriented, comma-delimited file:
//!
//! ```text
//! # comment
//! // comment
//! require,common_mp
//! include,mp_shared
//! reference,true
//! iterate,material
//! xmodel,body_mp
//! sound,,explosion
//! ```
//!
//! Fields are trimmed and carriage returns are stripped. Parsing is pure;
//! the resolver decides what each line means for the worklist.

use zonekit_core::{Error, Result};

/// One meaningful manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    /// Wait for a dependency zone to be loaded
    Require(String),
    /// Resolve another manifest into the same worklist
    Include(String),
    /// Toggle reference mode
    Reference(bool),
    /// Synthesize entries from a kind's source folder; `None` means every
    /// iterable kind
    Iterate(Option<String>),
    /// `<kind>,<name>[,<fallback>]`
    Asset {
        /// Kind name, not yet validated
        kind: String,
        /// Primary name field, possibly empty
        name: String,
        /// Fallback name field, possibly empty
        fallback: String,
    },
}

/// Whether a trimmed line is a comment or empty
pub fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with("//")
}

/// Parse one raw line; comments and blank lines give `Ok(None)`
pub fn parse_line(raw: &str) -> Result<Option<ManifestLine>> {
    let line = raw.trim_end_matches(['\r', '\n']).trim();
    if is_comment(line) {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let first = fields[0];
    let second = fields.get(1).copied().unwrap_or("");

    if first.is_empty() {
        return Err(Error::validation(format!("line has an empty kind field: {}", line)));
    }

    let directive = |what: &str| -> Result<String> {
        if second.is_empty() {
            Err(Error::validation(format!("`{}` needs an argument: {}", what, line)))
        } else {
            Ok(second.to_string())
        }
    };

    let parsed = match first {
        "require" => ManifestLine::Require(directive("require")?),
        "include" => ManifestLine::Include(directive("include")?),
        "reference" => {
            let value = directive("reference")?;
            ManifestLine::Reference(value.eq_ignore_ascii_case("true"))
        }
        "iterate" => {
            let value = directive("iterate")?;
            if value == "all" || value == "true" {
                ManifestLine::Iterate(None)
            } else {
                ManifestLine::Iterate(Some(value))
            }
        }
        kind => {
            if fields.len() < 2 {
                return Err(Error::validation(format!("asset line has no name field: {}", line)));
            }
            ManifestLine::Asset {
                kind: kind.to_string(),
                name: second.to_string(),
                fallback: fields.get(2).copied().unwrap_or("").to_string(),
            }
        }
    };
    Ok(Some(parsed))
}

/// Parse a whole manifest into `(line_number, line)` pairs
///
/// Line numbers are 1-based. Malformed lines are returned as errors in
/// place so the caller can report them and continue.
pub fn parse(text: &str) -> Vec<(usize, Result<ManifestLine>)> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| match parse_line(raw) {
            Ok(None) => None,
            Ok(Some(line)) => Some((i + 1, Ok(line))),
            Err(e) => Some((i + 1, Err(e))),
        })
        .collect()
}

/// Read a zone list, one zone per line, skipping blank lines and comments
pub fn parse_zone_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end_matches('\r').trim())
        .filter(|line| !is_comment(line))
        .map(str::to_string)
        .collect()
}
