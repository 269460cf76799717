use std::sync::LazyLock;

use regex::Regex;

static REFERENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?i:overlay|include)\s*:\s*(.*?)\s*$").unwrap());

static KEYED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[A-Za-z]+\s*:\s*(.+?)\s*$").unwrap());

/// A panel document split into searchable phrases and overlay references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub phrases: Vec<String>,
    /// Raw reference text, unresolved
    pub references: Vec<String>,
}

/// Why an overlay reference could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("empty overlay reference")]
    Empty,
    #[error("overlay reference '{0}' uses an unsupported scheme")]
    UnsupportedScheme(String),
    #[error("overlay reference '{0}' contains whitespace")]
    Whitespace(String),
    #[error("overlay reference '{0}' escapes the document root")]
    EscapesRoot(String),
}

/// Parse a panel document.
///
/// `overlay:`/`include:` lines are references, `key: value` lines contribute
/// their value, blank lines and `#` comments are skipped, and every other
/// line is a phrase as-is.
pub fn parse_document(text: &str) -> ParsedDocument {
    let mut doc = ParsedDocument::default();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(caps) = REFERENCE_LINE.captures(line) {
            doc.references.push(caps[1].to_string());
        } else if let Some(caps) = KEYED_LINE.captures(line) {
            doc.phrases.push(caps[1].to_string());
        } else {
            doc.phrases.push(trimmed.to_string());
        }
    }
    doc
}

/// Resolve `reference` against the document it appeared in.
///
/// Relative references resolve against the directory of `base`; a leading
/// `/` resolves against the document root.
pub fn resolve_reference(base: &str, reference: &str) -> Result<String, ReferenceError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(ReferenceError::Empty);
    }
    if reference.contains("://") {
        return Err(ReferenceError::UnsupportedScheme(reference.to_string()));
    }
    if reference.contains(char::is_whitespace) {
        return Err(ReferenceError::Whitespace(reference.to_string()));
    }

    let mut segments: Vec<&str> = Vec::new();
    let rest = match reference.strip_prefix('/') {
        Some(rest) => rest,
        None => {
            if let Some((dir, _)) = base.rsplit_once('/') {
                segments.extend(dir.split('/').filter(|s| !s.is_empty() && *s != "."));
            }
            reference
        }
    };

    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(ReferenceError::EscapesRoot(reference.to_string()));
                }
            }
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return Err(ReferenceError::Empty);
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_phrases_and_references() {
        let doc = parse_document(
            "\
# Whitespace panel
label: Show whitespace
description: Display spaces and tabs

Highlight trailing blanks
overlay: extra/markers.txt
Include: ../common.txt
",
        );
        assert_eq!(
            doc.phrases,
            vec![
                "Show whitespace",
                "Display spaces and tabs",
                "Highlight trailing blanks",
            ]
        );
        assert_eq!(doc.references, vec!["extra/markers.txt", "../common.txt"]);
    }

    #[test]
    fn empty_reference_is_kept_for_the_builder_to_reject() {
        let doc = parse_document("overlay:\n");
        assert_eq!(doc.references, vec![""]);
        assert!(doc.phrases.is_empty());
    }

    #[test]
    fn resolves_relative_to_base_directory() {
        assert_eq!(
            resolve_reference("panels/editor.txt", "extra/markers.txt").unwrap(),
            "panels/extra/markers.txt"
        );
        assert_eq!(
            resolve_reference("panels/editor.txt", "../common.txt").unwrap(),
            "common.txt"
        );
        assert_eq!(
            resolve_reference("editor.txt", "./common.txt").unwrap(),
            "common.txt"
        );
    }

    #[test]
    fn root_relative_reference() {
        assert_eq!(
            resolve_reference("panels/deep/editor.txt", "/shared/fonts.txt").unwrap(),
            "shared/fonts.txt"
        );
    }

    #[test]
    fn malformed_references() {
        assert_eq!(
            resolve_reference("a.txt", "  "),
            Err(ReferenceError::Empty)
        );
        assert!(matches!(
            resolve_reference("a.txt", "chrome://prefs/content/x.xul"),
            Err(ReferenceError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            resolve_reference("a.txt", "two words.txt"),
            Err(ReferenceError::Whitespace(_))
        ));
        assert!(matches!(
            resolve_reference("panels/a.txt", "../../outside.txt"),
            Err(ReferenceError::EscapesRoot(_))
        ));
    }
}
