//! --no-npm: repackage locally extracted Mobiscroll assets
//!
//! The user has unpacked a downloaded Mobiscroll release into
//! src/lib/mobiscroll/{js,css}. The tool reads the version out of the
//! asset header, synthesizes a minimal package for it, runs the package
//! manager's pack operation and points the project manifest at the
//! resulting tarball by relative path.

use crate::error::{Error, Result};
use crate::options::InstallSettings;
use crate::patch::patch_json;
use crate::pm::{CommandRunner, PackageManager};
use crate::project::{FrameworkKind, ProjectDescriptor};
use crate::prompt::Prompter;
use regex::Regex;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// Staging directory for the synthesized package. Removed after the final
/// patch step succeeds, never before.
const STAGE_DIR: &str = ".mobiscroll-pack";

#[derive(Debug)]
struct LocalAssets {
    js_file: String,
    css_file: String,
    version: String,
}

/// Repackage the extracted assets and rewrite the manifest. Returns the
/// settings the patch steps should use, plus the staging dir to clean up.
pub async fn prepare<R: CommandRunner, P: Prompter>(
    project: &ProjectDescriptor,
    runner: &R,
    prompter: &P,
) -> Result<(InstallSettings, PathBuf)> {
    if !matches!(
        project.framework,
        FrameworkKind::Angular | FrameworkKind::IonicAngular | FrameworkKind::IonicLegacy
    ) {
        return Err(Error::UnsupportedProject(
            "the --no-npm option is only available for Angular and Ionic projects".to_string(),
        ));
    }

    let assets = locate_assets(&project.root)?;
    prompter.info(&format!(
        "Found Mobiscroll {} in src/lib/mobiscroll",
        assets.version
    ));

    let stage = project.root.join(STAGE_DIR);
    stage_package(&project.root, &stage, &assets)?;

    let pm = PackageManager::detect(&project.root);
    let output = runner.run(pm.bin(), &pm.pack_args(), &stage).await?;
    let tarball = output
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.ends_with(".tgz"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("mobiscroll-angular-{}.tgz", assets.version));

    let produced = stage.join(&tarball);
    let target = project.root.join(&tarball);
    fs::rename(&produced, &target).map_err(|e| Error::io(&produced, e))?;
    prompter.info(&format!("Packed the Mobiscroll assets into {}", tarball));

    patch_json(&project.root.join("package.json"), |doc| {
        let deps = crate::patch::json::ensure_object_path(doc, &["dependencies"]);
        if !deps.is_object() {
            *deps = json!({});
        }
        deps.as_object_mut().expect("just ensured object").insert(
            "@mobiscroll/angular".to_string(),
            json!(format!("file:./{}", tarball)),
        );
        Ok(())
    })?;
    prompter.success("package.json now loads Mobiscroll from the packed archive");

    let settings = InstallSettings {
        import_name: "@mobiscroll/angular".to_string(),
        version: assets.version.clone(),
        js_module_path: "@mobiscroll/angular".to_string(),
        css_path: format!("node_modules/@mobiscroll/angular/css/{}", assets.css_file),
        api_key: None,
    };
    Ok((settings, stage))
}

/// Find the extracted asset files by the conventional naming pattern.
fn locate_assets(root: &Path) -> Result<LocalAssets> {
    let js_file = find_asset(&root.join("src/lib/mobiscroll/js"), r"^mobiscroll\..*\.js$");
    let css_file = find_asset(&root.join("src/lib/mobiscroll/css"), r"^mobiscroll\..*\.css$");

    let (Some(js_file), Some(css_file)) = (js_file, css_file) else {
        return Err(Error::UnsupportedProject(
            "no Mobiscroll js/css files were found in this project.\n\
             Please unpack the downloaded Mobiscroll package and copy the lib folder into src/!"
                .to_string(),
        ));
    };

    let js_path = root.join("src/lib/mobiscroll/js").join(&js_file);
    let version = read_embedded_version(&js_path)?;

    Ok(LocalAssets {
        js_file,
        css_file,
        version,
    })
}

fn find_asset(dir: &Path, pattern: &str) -> Option<String> {
    let pattern = Regex::new(pattern).expect("static pattern");
    let entries = fs::read_dir(dir).ok()?;
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| pattern.is_match(name))
        .collect();
    names.sort();
    names.into_iter().next()
}

/// The release header comment carries the version:
/// `/*! Mobiscroll v5.23.0 ... */`. The filename is the fallback.
fn read_embedded_version(js_path: &Path) -> Result<String> {
    let content = fs::read_to_string(js_path).map_err(|e| Error::io(js_path, e))?;
    let pattern = Regex::new(r"[Mm]obiscroll[^0-9]*v?(\d+\.\d+\.\d+)").expect("static pattern");

    if let Some(captures) = pattern.captures(&content) {
        return Ok(captures[1].to_string());
    }
    let name = js_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    pattern
        .captures(name)
        .map(|c| c[1].to_string())
        .ok_or_else(|| {
            Error::UnsupportedProject(format!(
                "could not determine the Mobiscroll version from {}",
                js_path.display()
            ))
        })
}

/// Lay out the synthesized package in the staging directory.
fn stage_package(root: &Path, stage: &Path, assets: &LocalAssets) -> Result<()> {
    for sub in ["js", "css"] {
        let dir = stage.join(sub);
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
    }

    let manifest = json!({
        "name": "@mobiscroll/angular",
        "version": assets.version,
        "main": format!("js/{}", assets.js_file),
        "style": format!("css/{}", assets.css_file),
    });
    let manifest_path = stage.join("package.json");
    fs::write(
        &manifest_path,
        serde_json::to_string_pretty(&manifest).expect("static document") + "\n",
    )
    .map_err(|e| Error::io(&manifest_path, e))?;

    let js_src = root.join("src/lib/mobiscroll/js").join(&assets.js_file);
    let css_src = root.join("src/lib/mobiscroll/css").join(&assets.css_file);
    fs::copy(&js_src, stage.join("js").join(&assets.js_file))
        .map_err(|e| Error::io(&js_src, e))?;
    fs::copy(&css_src, stage.join("css").join(&assets.css_file))
        .map_err(|e| Error::io(&css_src, e))?;
    Ok(())
}

/// Remove the staging directory. Runs only after the last patch step.
pub fn cleanup(stage: &Path) {
    let _ = fs::remove_dir_all(stage);
}
