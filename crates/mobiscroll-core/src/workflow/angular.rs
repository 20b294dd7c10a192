//! Angular / Ionic 4+ configuration
//!
//! Two independent patch targets: the bootstrap module (or standalone
//! component) file and the build config's styles list. A missing target is
//! warned about and skipped; the sibling step still runs.

use crate::error::{Error, Result};
use crate::options::{InstallSettings, RunOptions};
use crate::patch::{inject_api_key, inject_module_import, patch_json, push_unique, remove_matching};
use crate::project::{BuildConfigKind, ProjectDescriptor};
use crate::prompt::Prompter;
use regex::Regex;
use serde_json::Value;

const DOCS_URL: &str = "https://docs.mobiscroll.com/angular";

/// Styles entries left behind by earlier runs or earlier package variants.
fn stale_styles_pattern() -> Regex {
    Regex::new(r"@mobiscroll/|lib/mobiscroll/|mobiscroll\.(?:min\.css|scss)")
        .expect("static pattern")
}

pub fn apply<P: Prompter>(
    project: &ProjectDescriptor,
    settings: &InstallSettings,
    opts: &RunOptions,
    prompter: &P,
) -> Result<()> {
    prompter.info("Configuring Angular app...");

    patch_bootstrap(project, settings, opts, prompter)?;
    patch_styles(project, settings, prompter)?;

    Ok(())
}

/// Inject MbscModule and FormsModule (plus the trial api key) into the
/// bootstrap file.
fn patch_bootstrap<P: Prompter>(
    project: &ProjectDescriptor,
    settings: &InstallSettings,
    opts: &RunOptions,
    prompter: &P,
) -> Result<()> {
    if opts.lazy {
        prompter.info("Skipping module injection (--lazy). Include the modules manually:");
        print_manual_module_help(&settings.js_module_path);
        return Ok(());
    }

    let target = project.bootstrap_file();
    let with_global = settings.api_key.is_some();

    let result = inject_module_import(&target, "MbscModule", &settings.js_module_path, with_global)
        .and_then(|_| inject_module_import(&target, "FormsModule", "@angular/forms", false))
        .and_then(|_| match &settings.api_key {
            Some(key) => inject_api_key(&target, key, project.decorator_anchor()),
            None => crate::patch::bootstrap::remove_api_key(&target),
        });

    match result {
        Ok(_) => Ok(()),
        Err(err) if err.is_recoverable() => {
            prompter.warning(&format!(
                "{} - include the modules manually (see {})",
                err, DOCS_URL
            ));
            print_manual_module_help(&settings.js_module_path);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Add the stylesheet entry to the build config, clearing entries from
/// previous runs so a variant switch replaces instead of stacking.
fn patch_styles<P: Prompter>(
    project: &ProjectDescriptor,
    settings: &InstallSettings,
    prompter: &P,
) -> Result<()> {
    let result = match project.build_config {
        BuildConfigKind::AngularJson => {
            let path = project.root.join("angular.json");
            prompter.info("Adding stylesheet to angular.json");
            patch_json(&path, |doc| {
                let mut patched = false;
                if let Some(projects) = doc.get_mut("projects").and_then(Value::as_object_mut) {
                    for project_cfg in projects.values_mut() {
                        if let Some(styles) = project_cfg
                            .pointer_mut("/architect/build/options/styles")
                            .and_then(Value::as_array_mut)
                        {
                            remove_matching(styles, &stale_styles_pattern());
                            push_unique(styles, Value::String(settings.css_path.clone()));
                            patched = true;
                        }
                    }
                }
                if !patched {
                    return Err(Error::UnsupportedProject(
                        "no build target with a styles list was found in angular.json".to_string(),
                    ));
                }
                Ok(())
            })
        }
        BuildConfigKind::AngularCliJson => {
            let path = project.root.join(".angular-cli.json");
            prompter.info("Adding stylesheet to .angular-cli.json");
            // paths in the 1.x config are relative to src/
            let css_path = format!("../{}", settings.css_path);
            patch_json(&path, |doc| {
                if let Some(apps) = doc.get_mut("apps").and_then(Value::as_array_mut) {
                    for app in apps {
                        if let Some(styles) = app.get_mut("styles").and_then(Value::as_array_mut) {
                            remove_matching(styles, &stale_styles_pattern());
                            push_unique(styles, Value::String(css_path.clone()));
                        }
                    }
                }
                Ok(())
            })
        }
        _ => Err(Error::PatchTargetMissing(project.root.join("angular.json"))),
    };

    match result {
        Ok(()) => Ok(()),
        Err(err) if err.is_recoverable() => {
            prompter.warning(&format!(
                "No Angular CLI config was found. If this is not an Angular CLI app, make sure to load {} into your app. (see {})",
                settings.css_path, DOCS_URL
            ));
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn print_manual_module_help(module_path: &str) {
    println!();
    println!("    import {{ MbscModule }} from '{}';", module_path);
    println!("    import {{ FormsModule }} from '@angular/forms';");
    println!();
    println!("    @NgModule({{");
    println!("        imports: [");
    println!("            // leave the other imports as they are");
    println!("            MbscModule,");
    println!("            FormsModule");
    println!("        ],");
    println!("        // ...");
    println!("    }})");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{FrameworkKind, PackageManifest, StylesheetFormat};
    use crate::prompt::ScriptedPrompter;
    use serde_json::json;
    use std::fs;

    const APP_MODULE: &str = "\
import { NgModule } from '@angular/core';

@NgModule({
  imports: [
    BrowserModule
  ],
})
export class AppModule {}
";

    const ANGULAR_JSON: &str = r#"{
    "version": 1,
    "projects": {
        "app": {
            "architect": {
                "build": {
                    "options": {
                        "styles": ["src/styles.css"],
                        "scripts": []
                    }
                }
            }
        }
    }
}"#;

    fn fixture(dir: &tempfile::TempDir) -> ProjectDescriptor {
        fs::create_dir_all(dir.path().join("src/app")).unwrap();
        fs::write(dir.path().join("src/app/app.module.ts"), APP_MODULE).unwrap();
        fs::write(dir.path().join("angular.json"), ANGULAR_JSON).unwrap();
        ProjectDescriptor {
            root: dir.path().to_path_buf(),
            manifest: PackageManifest::default(),
            framework: FrameworkKind::Angular,
            framework_major: Some(14),
            build_config: BuildConfigKind::AngularJson,
            stylesheet: StylesheetFormat::Css,
            standalone: false,
        }
    }

    fn read_styles(dir: &tempfile::TempDir) -> Vec<Value> {
        let doc: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("angular.json")).unwrap(),
        )
        .unwrap();
        doc.pointer("/projects/app/architect/build/options/styles")
            .unwrap()
            .as_array()
            .unwrap()
            .clone()
    }

    #[test]
    fn first_run_patches_both_targets() {
        let dir = tempfile::tempdir().unwrap();
        let project = fixture(&dir);
        let settings =
            InstallSettings::for_registry_package("@mobiscroll/angular", "5.23.0", false, None);
        let opts = RunOptions::default();

        apply(&project, &settings, &opts, &ScriptedPrompter::default()).unwrap();

        let styles = read_styles(&dir);
        assert_eq!(styles[0], json!("src/styles.css"));
        assert_eq!(
            styles[1],
            json!("node_modules/@mobiscroll/angular/dist/css/mobiscroll.min.css")
        );

        let module = fs::read_to_string(dir.path().join("src/app/app.module.ts")).unwrap();
        assert!(module.contains("import { MbscModule } from '@mobiscroll/angular';"));
        assert!(module.contains("import { FormsModule } from '@angular/forms';"));
        assert!(module.contains("MbscModule,"));
    }

    #[test]
    fn second_run_produces_no_diff() {
        let dir = tempfile::tempdir().unwrap();
        let project = fixture(&dir);
        let settings =
            InstallSettings::for_registry_package("@mobiscroll/angular", "5.23.0", false, None);
        let opts = RunOptions::default();
        let prompter = ScriptedPrompter::default();

        apply(&project, &settings, &opts, &prompter).unwrap();
        let module_once = fs::read_to_string(dir.path().join("src/app/app.module.ts")).unwrap();
        let json_once = fs::read_to_string(dir.path().join("angular.json")).unwrap();

        apply(&project, &settings, &opts, &prompter).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("src/app/app.module.ts")).unwrap(),
            module_once
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("angular.json")).unwrap(),
            json_once
        );
    }

    #[test]
    fn variant_switch_replaces_the_styles_entry() {
        let dir = tempfile::tempdir().unwrap();
        let project = fixture(&dir);
        let opts = RunOptions::default();
        let prompter = ScriptedPrompter::default();

        let trial = InstallSettings::for_registry_package(
            "@mobiscroll/angular-trial",
            "5.23.0",
            false,
            Some("key".to_string()),
        );
        apply(&project, &trial, &opts, &prompter).unwrap();

        let licensed =
            InstallSettings::for_registry_package("@mobiscroll/angular", "5.23.0", false, None);
        apply(&project, &licensed, &opts, &prompter).unwrap();

        let styles = read_styles(&dir);
        assert_eq!(styles.len(), 2);
        assert!(styles[1].as_str().unwrap().contains("@mobiscroll/angular/"));

        let module = fs::read_to_string(dir.path().join("src/app/app.module.ts")).unwrap();
        assert_eq!(module.matches("from '@mobiscroll/").count(), 1);
        assert!(module.contains("from '@mobiscroll/angular';"));
    }

    #[test]
    fn missing_bootstrap_file_only_warns() {
        let dir = tempfile::tempdir().unwrap();
        let project = fixture(&dir);
        fs::remove_file(dir.path().join("src/app/app.module.ts")).unwrap();

        let settings =
            InstallSettings::for_registry_package("@mobiscroll/angular", "5.23.0", false, None);
        let opts = RunOptions::default();

        // styles must still be patched
        apply(&project, &settings, &opts, &ScriptedPrompter::default()).unwrap();
        assert_eq!(read_styles(&dir).len(), 2);
    }

    #[test]
    fn standalone_component_receives_the_injection() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = fixture(&dir);
        project.standalone = true;
        fs::write(
            dir.path().join("src/app/app.component.ts"),
            "@Component({\n  standalone: true,\n  imports: [\n    CommonModule\n  ],\n})\nexport class AppComponent {}\n",
        )
        .unwrap();

        let settings = InstallSettings::for_registry_package(
            "@mobiscroll/angular",
            "5.23.0",
            false,
            Some("key".to_string()),
        );
        let opts = RunOptions::default();
        apply(&project, &settings, &opts, &ScriptedPrompter::default()).unwrap();

        let component = fs::read_to_string(dir.path().join("src/app/app.component.ts")).unwrap();
        assert!(component.contains("MbscModule,"));
        assert!(component.contains("mobiscroll.apiKey = 'key';\n\n@Component"));
        // the module file is untouched
        let module = fs::read_to_string(dir.path().join("src/app/app.module.ts")).unwrap();
        assert!(!module.contains("MbscModule"));
    }
}
