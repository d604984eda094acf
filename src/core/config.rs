use crate::error::Error;
use crate::utils::io;
use crate::Result;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;

// ============================================================================
// Document formats
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Pick a format from a file extension; anything unrecognized is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            Some("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }
}

// ============================================================================
// Spec input
// ============================================================================

/// Read a spec from string, file (@path), or stdin (-).
///
/// Returns the raw text and the format it should be parsed with. Inline
/// strings and stdin are JSON; files use their extension.
pub(crate) fn read_spec_to_string(spec: &str) -> Result<(String, DocumentFormat)> {
    use std::io::IsTerminal;

    if spec.trim() == "-" {
        let mut buf = String::new();
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(Error::validation_invalid_argument(
                "spec",
                "Cannot read spec from stdin when stdin is a TTY",
                None,
                None,
            ));
        }
        stdin
            .read_to_string(&mut buf)
            .map_err(|e| Error::internal_io(e.to_string(), Some("read stdin".to_string())))?;
        return Ok((buf, DocumentFormat::Json));
    }

    if let Some(path) = spec.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(Error::validation_invalid_argument(
                "spec",
                "Invalid spec '@' (missing file path)",
                None,
                None,
            ));
        }
        return read_spec_file(Path::new(path.trim()));
    }

    let candidate = Path::new(spec.trim());
    if !is_inline_document(spec) && candidate.is_file() {
        return read_spec_file(candidate);
    }

    Ok((spec.to_string(), DocumentFormat::Json))
}

fn read_spec_file(path: &Path) -> Result<(String, DocumentFormat)> {
    let raw = io::read_file(path, &format!("read {}", path.display()))?;
    Ok((raw, DocumentFormat::from_path(path)))
}

/// Detect if input is an inline JSON document (starts with '{' or '[').
pub(crate) fn is_inline_document(input: &str) -> bool {
    let trimmed = input.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

/// Parse text in the given format into a typed value.
pub(crate) fn parse_document<T: DeserializeOwned>(
    raw: &str,
    format: DocumentFormat,
    context: &str,
) -> Result<T> {
    let preview = || Some(raw.chars().take(200).collect::<String>());

    match format {
        DocumentFormat::Json => serde_json::from_str(raw)
            .map_err(|e| Error::validation_invalid_json(e, Some(context.to_string()), preview())),
        DocumentFormat::Yaml => serde_yml::from_str(raw)
            .map_err(|e| Error::validation_invalid_json(e, Some(context.to_string()), preview())),
        DocumentFormat::Toml => toml::from_str(raw)
            .map_err(|e| Error::validation_invalid_json(e, Some(context.to_string()), preview())),
    }
}

/// Read and parse a spec in one step.
pub fn load_spec<T: DeserializeOwned>(spec: &str, context: &str) -> Result<T> {
    let (raw, format) = read_spec_to_string(spec)?;
    parse_document(&raw, format, context)
}
