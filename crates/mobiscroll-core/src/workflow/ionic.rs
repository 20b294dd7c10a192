//! Ionic 2/3 (`ionic-angular`) configuration
//!
//! Legacy Ionic builds have no styles list; assets are copied into the
//! web output by an `ionic_copy` hook script referenced from package.json.
//! Three patch targets: the hook entry + script file, the stylesheet link
//! in src/index.html, and the bootstrap module.

use crate::error::Result;
use crate::options::{InstallSettings, RunOptions};
use crate::patch::{inject_api_key, inject_module_import, patch_json, patch_text, remove_api_key, Insertion, TextEdit};
use crate::project::ProjectDescriptor;
use crate::prompt::Prompter;
use regex::Regex;
use serde_json::{json, Value};
use std::fs;

const DOCS_URL: &str = "https://docs.mobiscroll.com/angular";

/// Stylesheet href as served from the build output, where the copy script
/// puts it.
const WWW_CSS_HREF: &str = "lib/mobiscroll/css/mobiscroll.min.css";

pub fn apply<P: Prompter>(
    project: &ProjectDescriptor,
    settings: &InstallSettings,
    opts: &RunOptions,
    prompter: &P,
) -> Result<()> {
    prompter.info("Configuring Ionic app...");

    patch_copy_hook(project, settings, opts, prompter)?;
    patch_index_html(project, prompter)?;
    patch_bootstrap(project, settings, opts, prompter)?;

    Ok(())
}

fn copy_script_name(opts: &RunOptions) -> String {
    let mut name = String::from("copy-mobiscroll-css");
    if opts.npm_source {
        name.push_str("-npm");
    }
    if opts.trial {
        name.push_str("-trial");
    }
    name.push_str(".js");
    name
}

/// Wire the ionic_copy hook into package.json and write the script it
/// points at. An existing foreign ionic_copy hook is left alone; our own
/// previous hook is replaced.
fn patch_copy_hook<P: Prompter>(
    project: &ProjectDescriptor,
    settings: &InstallSettings,
    opts: &RunOptions,
    prompter: &P,
) -> Result<()> {
    let script_name = copy_script_name(opts);
    let script_ref = format!("./scripts/{}", script_name);

    patch_json(&project.root.join("package.json"), |doc| {
        let config = doc
            .as_object_mut()
            .map(|o| o.entry("config").or_insert_with(|| json!({})))
            .and_then(Value::as_object_mut);
        if let Some(config) = config {
            let ours = config
                .get("ionic_copy")
                .and_then(Value::as_str)
                .is_none_or(|v| v.contains("copy-mobiscroll-css"));
            if ours {
                config.insert("ionic_copy".to_string(), json!(script_ref));
            }
        }
        Ok(())
    })?;

    let src_glob = if opts.npm_source {
        format!("{{{{ROOT}}}}/node_modules/{}/dist/css/*", settings.import_name)
    } else {
        "{{SRC}}/lib/mobiscroll/css/*".to_string()
    };
    let script = format!(
        "module.exports = {{\n  copyMobiscrollCss: {{\n    src: ['{}'],\n    dest: '{{{{WWW}}}}/lib/mobiscroll/css/'\n  }}\n}}\n",
        src_glob
    );

    let scripts_dir = project.root.join("scripts");
    fs::create_dir_all(&scripts_dir).map_err(|e| crate::Error::io(&scripts_dir, e))?;
    let script_path = scripts_dir.join(&script_name);
    fs::write(&script_path, script).map_err(|e| crate::Error::io(&script_path, e))?;

    prompter.info(&format!("Added the {} copy hook to package.json", script_name));
    Ok(())
}

/// Idempotent stylesheet link in front of the app's first stylesheet link.
fn patch_index_html<P: Prompter>(project: &ProjectDescriptor, prompter: &P) -> Result<()> {
    let edit = TextEdit {
        skip_if_contains: Some(WWW_CSS_HREF.to_string()),
        remove: vec![Regex::new(
            r#"(?m)^[ \t]*<link rel="stylesheet" href="[^"]*mobiscroll[^"]*">\n"#,
        )
        .expect("static pattern")],
        insert: Some(Insertion::ReplaceMatch {
            pattern: Regex::new(r#"<link [^>]+ rel="stylesheet">"#).expect("static pattern"),
            replacement: format!("<link rel=\"stylesheet\" href=\"{}\">\n  $0", WWW_CSS_HREF),
        }),
    };

    match patch_text(&project.root.join("src/index.html"), &edit) {
        Ok(_) => Ok(()),
        Err(err) if err.is_recoverable() => {
            prompter.warning(&format!(
                "{} - load {} into your index.html manually (see {})",
                err, WWW_CSS_HREF, DOCS_URL
            ));
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn patch_bootstrap<P: Prompter>(
    project: &ProjectDescriptor,
    settings: &InstallSettings,
    opts: &RunOptions,
    prompter: &P,
) -> Result<()> {
    if opts.lazy {
        prompter.info("Skipping module injection (--lazy).");
        return Ok(());
    }

    let target = project.root.join("src/app/app.module.ts");
    let with_global = settings.api_key.is_some();

    let result = inject_module_import(&target, "MbscModule", &settings.js_module_path, with_global)
        .and_then(|_| inject_module_import(&target, "FormsModule", "@angular/forms", false))
        .and_then(|_| match &settings.api_key {
            Some(key) => inject_api_key(&target, key, "@NgModule"),
            None => remove_api_key(&target),
        });

    match result {
        Ok(_) => Ok(()),
        Err(err) if err.is_recoverable() => {
            prompter.warning(&format!(
                "{} - include MbscModule and FormsModule manually (see {})",
                err, DOCS_URL
            ));
            Ok(())
        }
        Err(err) => Err(err),
    }
}
