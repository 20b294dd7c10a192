//! Structural JSON patching
//!
//! Files are parsed, mutated in memory and written back fully serialized,
//! so a parse failure can never leave a half-written config behind.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read `path` as JSON, hand the document to `mutate`, write the result
/// back pretty-printed (4-space indent, matching how npm itself writes
/// package.json).
pub fn patch_json<F>(path: &Path, mutate: F) -> Result<()>
where
    F: FnOnce(&mut Value) -> Result<()>,
{
    if !path.exists() {
        return Err(Error::PatchTargetMissing(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let mut doc: Value = serde_json::from_str(&raw).map_err(|e| Error::json(path, e))?;

    mutate(&mut doc)?;

    let rendered = to_pretty_string(&doc).map_err(|e| Error::json(path, e))?;
    fs::write(path, rendered).map_err(|e| Error::io(path, e))
}

fn to_pretty_string(doc: &Value) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut out, formatter);
    serde::Serialize::serialize(doc, &mut serializer)?;
    out.push(b'\n');
    Ok(String::from_utf8(out).expect("serde_json emits UTF-8"))
}

/// Append a value to an array unless an equal element is already there.
/// Returns true when the array changed.
pub fn push_unique(array: &mut Vec<Value>, value: Value) -> bool {
    if array.contains(&value) {
        return false;
    }
    array.push(value);
    true
}

/// Drop every string element matching `pattern` (used to clear stale
/// Mobiscroll stylesheet entries before adding the current one). Returns
/// the number of removed elements.
pub fn remove_matching(array: &mut Vec<Value>, pattern: &Regex) -> usize {
    let before = array.len();
    array.retain(|entry| match entry.as_str() {
        Some(s) => !pattern.is_match(s),
        None => true,
    });
    before - array.len()
}

/// Walk a dotted path of object keys, creating intermediate objects.
pub fn ensure_object_path<'a>(doc: &'a mut Value, path: &[&str]) -> &'a mut Value {
    let mut cursor = doc;
    for key in path {
        if !cursor.is_object() {
            *cursor = Value::Object(Default::default());
        }
        cursor = cursor
            .as_object_mut()
            .expect("just ensured object")
            .entry(key.to_string())
            .or_insert(Value::Null);
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_unique_is_idempotent() {
        let mut array = vec![json!("styles.css")];
        assert!(push_unique(&mut array, json!("mobiscroll.min.css")));
        assert!(!push_unique(&mut array, json!("mobiscroll.min.css")));
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn remove_matching_only_touches_matches() {
        let mut array = vec![
            json!("src/styles.css"),
            json!("node_modules/@mobiscroll/angular-trial/dist/css/mobiscroll.min.css"),
            json!({ "input": "theme.css" }),
        ];
        let pattern = Regex::new(r"mobiscroll").unwrap();
        assert_eq!(remove_matching(&mut array, &pattern), 1);
        assert_eq!(array.len(), 2);
        assert_eq!(array[0], json!("src/styles.css"));
    }

    #[test]
    fn patch_preserves_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("angular.json");
        fs::write(
            &path,
            r#"{"version": 1, "projects": {"app": {"tags": ["a", "b"]}}, "cli": {"analytics": false}}"#,
        )
        .unwrap();

        patch_json(&path, |doc| {
            let tags = doc["projects"]["app"]["tags"].as_array_mut().unwrap();
            push_unique(tags, json!("c"));
            Ok(())
        })
        .unwrap();

        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["version"], json!(1));
        assert_eq!(doc["cli"]["analytics"], json!(false));
        assert_eq!(doc["projects"]["app"]["tags"], json!(["a", "b", "c"]));
    }

    #[test]
    fn unparseable_json_fails_without_touching_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = patch_json(&path, |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn missing_file_is_a_patch_target_miss() {
        let dir = tempfile::tempdir().unwrap();
        let err = patch_json(&dir.path().join("nope.json"), |_| Ok(())).unwrap_err();
        assert!(matches!(err, Error::PatchTargetMissing(_)));
        assert!(err.is_recoverable());
    }
}
