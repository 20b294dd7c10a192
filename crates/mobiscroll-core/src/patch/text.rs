//! Regex-based text patching with duplicate-injection protection

use crate::error::{Error, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Where and how the new fragment goes in.
#[derive(Debug, Clone)]
pub enum Insertion {
    /// Replace the first match of `pattern` with `replacement`.
    /// `$0` in the replacement refers to the matched text.
    ReplaceMatch { pattern: Regex, replacement: String },
    Append(String),
    Prepend(String),
}

/// One named transformation of a text file.
///
/// `remove` patterns always run first, clearing any previously injected
/// variant, then the insertion is applied unless `skip_if_contains` (or the
/// inserted fragment itself) is already present. Re-running the same edit
/// therefore produces byte-identical output, and re-running a *changed*
/// edit (trial -> licensed) replaces instead of stacking.
#[derive(Debug, Clone, Default)]
pub struct TextEdit {
    /// Marker proving the edit was already applied with these parameters
    pub skip_if_contains: Option<String>,
    /// Previous-injection patterns to strip before inserting
    pub remove: Vec<Regex>,
    pub insert: Option<Insertion>,
}

/// Apply `edit` to the file at `path`. Returns true when the file changed.
pub fn patch_text(path: &Path, edit: &TextEdit) -> Result<bool> {
    if !path.exists() {
        return Err(Error::PatchTargetMissing(path.to_path_buf()));
    }
    let original = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let patched = apply(&original, edit);

    if patched == original {
        return Ok(false);
    }
    fs::write(path, patched).map_err(|e| Error::io(path, e))?;
    Ok(true)
}

/// Pure application of an edit to a content string.
pub fn apply(content: &str, edit: &TextEdit) -> String {
    let mut content = content.to_string();

    for pattern in &edit.remove {
        content = pattern.replace_all(&content, "").into_owned();
    }

    let Some(insert) = &edit.insert else {
        return content;
    };

    if let Some(marker) = &edit.skip_if_contains {
        if content.contains(marker) {
            return content;
        }
    }

    match insert {
        Insertion::ReplaceMatch {
            pattern,
            replacement,
        } => {
            if content.contains(replacement.as_str()) {
                return content;
            }
            pattern.replace(&content, replacement.as_str()).into_owned()
        }
        Insertion::Append(fragment) => {
            if content.contains(fragment.as_str()) {
                return content;
            }
            content.push_str(fragment);
            content
        }
        Insertion::Prepend(fragment) => {
            if content.contains(fragment.as_str()) {
                return content;
            }
            let mut out = fragment.clone();
            out.push_str(&content);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit_with_prepend(fragment: &str) -> TextEdit {
        TextEdit {
            insert: Some(Insertion::Prepend(fragment.to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn prepend_is_idempotent() {
        let edit = edit_with_prepend("import 'mobiscroll.css';\n");
        let once = apply("const x = 1;\n", &edit);
        let twice = apply(&once, &edit);
        assert_eq!(once, twice);
        assert!(once.starts_with("import 'mobiscroll.css';\n"));
    }

    #[test]
    fn remove_runs_before_insert() {
        // switching trial -> licensed replaces the old line
        let trial = "import '@mobiscroll/react-trial/dist/css/mobiscroll.min.css';\nrender();\n";
        let edit = TextEdit {
            skip_if_contains: None,
            remove: vec![Regex::new(r"(?m)^import '@mobiscroll/react[^']*';\n").unwrap()],
            insert: Some(Insertion::Prepend(
                "import '@mobiscroll/react/dist/css/mobiscroll.min.css';\n".to_string(),
            )),
        };
        let out = apply(trial, &edit);
        assert_eq!(
            out,
            "import '@mobiscroll/react/dist/css/mobiscroll.min.css';\nrender();\n"
        );
        assert_eq!(apply(&out, &edit), out);
    }

    #[test]
    fn replace_match_keeps_anchor_via_dollar_zero() {
        let html = "<head>\n  <link href=\"app.css\" rel=\"stylesheet\">\n</head>\n";
        let edit = TextEdit {
            skip_if_contains: Some("mobiscroll.min.css".to_string()),
            remove: vec![],
            insert: Some(Insertion::ReplaceMatch {
                pattern: Regex::new(r#"<link [^>]+ rel="stylesheet">"#).unwrap(),
                replacement: "<link rel=\"stylesheet\" href=\"mobiscroll.min.css\">\n  $0"
                    .to_string(),
            }),
        };
        let out = apply(html, &edit);
        assert!(out.contains("mobiscroll.min.css"));
        assert!(out.contains("app.css"));
        // second application is a no-op thanks to the marker
        assert_eq!(apply(&out, &edit), out);
    }

    #[test]
    fn missing_file_reports_target() {
        let dir = tempfile::tempdir().unwrap();
        let err = patch_text(&dir.path().join("index.html"), &TextEdit::default()).unwrap_err();
        assert!(matches!(err, Error::PatchTargetMissing(_)));
    }

    #[test]
    fn untouched_file_is_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.ts");
        fs::write(&path, "import 'x';\n").unwrap();
        let edit = edit_with_prepend("import 'x';\n");
        assert!(!patch_text(&path, &edit).unwrap());
    }
}
