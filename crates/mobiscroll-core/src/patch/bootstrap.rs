//! Angular bootstrap file injection
//!
//! Patches the module (or standalone component) file of an Angular/Ionic
//! app: a top-of-file import statement plus an entry in the decorator's
//! `imports: [` array, and the trial api key when applicable. Previous
//! Mobiscroll injections are stripped first so switching package variants
//! swaps the import instead of stacking a second one.

use crate::error::{Error, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Import lines pointing at any Mobiscroll package variant or at the
/// extracted lib folder used by --no-npm installs.
fn previous_import_pattern() -> Regex {
    Regex::new(r"(?m)^import \{[^}]*\} from '(?:@mobiscroll/[^']*|[^']*lib/mobiscroll/[^']*)';\n")
        .expect("static pattern")
}

fn array_entry_pattern(symbol: &str) -> Regex {
    Regex::new(&format!(r"(?m)^[ \t]*{},[ \t]*\n", regex::escape(symbol))).expect("static pattern")
}

/// Insert `symbol` into the bootstrap construct at `path`: an import
/// statement for `module_path` at the top of the file and the symbol right
/// after the `imports: [` anchor. `with_global` also imports the
/// `mobiscroll` global used for api-key injection.
///
/// No-op when the symbol is already wired up; a missing file is reported
/// as a recoverable failure, not a crash.
pub fn inject_module_import(
    path: &Path,
    symbol: &str,
    module_path: &str,
    with_global: bool,
) -> Result<bool> {
    if !path.exists() {
        return Err(Error::PatchTargetMissing(path.to_path_buf()));
    }
    let original = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    let import_line = if with_global {
        format!("import {{ {}, mobiscroll }} from '{}';\n", symbol, module_path)
    } else {
        format!("import {{ {} }} from '{}';\n", symbol, module_path)
    };

    // Exact import already present: the file is in the desired state.
    if original.contains(&import_line) {
        return Ok(false);
    }

    let mut content = original.clone();

    // Only our own injections are cleaned up. Imports from other packages
    // (FormsModule) are left alone and simply skipped when present.
    if module_path.contains("mobiscroll") {
        content = previous_import_pattern()
            .replace_all(&content, "")
            .into_owned();
        content = array_entry_pattern(symbol)
            .replace_all(&content, "")
            .into_owned();
    }

    if !content.contains(symbol) {
        content.insert_str(0, &import_line);

        if let Some(anchor) = content.find("imports: [") {
            let insert_at = anchor + "imports: [".len();
            content.insert_str(insert_at, &format!("\n    {},", symbol));
        }
    }

    if content == original {
        return Ok(false);
    }
    fs::write(path, content).map_err(|e| Error::io(path, e))?;
    Ok(true)
}

/// Strip a previously injected trial api key, for trial -> licensed swaps.
pub fn remove_api_key(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Err(Error::PatchTargetMissing(path.to_path_buf()));
    }
    let original = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let content = api_key_pattern().replace_all(&original, "").into_owned();
    if content == original {
        return Ok(false);
    }
    fs::write(path, content).map_err(|e| Error::io(path, e))?;
    Ok(true)
}

fn api_key_pattern() -> Regex {
    Regex::new(r"(?m)^mobiscroll\.apiKey = '[^']*';\n\n").expect("static pattern")
}

/// Embed the trial access token in front of the decorator. Re-running with
/// a different key replaces the old assignment.
pub fn inject_api_key(path: &Path, key: &str, decorator: &str) -> Result<bool> {
    if !path.exists() {
        return Err(Error::PatchTargetMissing(path.to_path_buf()));
    }
    let original = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let mut content = api_key_pattern().replace_all(&original, "").into_owned();

    if !content.contains("mobiscroll.apiKey") {
        if let Some(anchor) = content.find(decorator) {
            content.insert_str(anchor, &format!("mobiscroll.apiKey = '{}';\n\n", key));
        }
    }

    if content == original {
        return Ok(false);
    }
    fs::write(path, content).map_err(|e| Error::io(path, e))?;
    Ok(true)
}
